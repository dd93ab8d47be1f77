//! Bounds-checked field access over an instance buffer.

use crate::codec::{read_u16, read_u32, write_u16, write_u32};
use crate::definition::NO_INDEX;
use crate::tier::Tier;

use super::layout::{
    GENERATION, LayoutSpec, MACHINE_ID, MICRO_STEP, PHASE, QUEUE_COUNT, RNG_SEED, STATUS,
};
use super::{InstanceError, Phase, StatusFlags};

/// Mutable view of one instance, tagged with its tier layout.
#[derive(Debug)]
pub struct InstanceView<'a> {
    layout: &'static LayoutSpec,
    bytes: &'a mut [u8],
}

impl<'a> InstanceView<'a> {
    /// Wrap a buffer whose length must match the tier exactly.
    pub fn from_bytes(tier: Tier, bytes: &'a mut [u8]) -> Result<Self, InstanceError> {
        let layout = tier.layout();
        if bytes.len() != layout.size {
            return Err(InstanceError::SizeMismatch {
                tier,
                actual: bytes.len(),
            });
        }
        Ok(Self { layout, bytes })
    }

    /// Wrap a buffer, inferring the tier from its length.
    pub fn detect(bytes: &'a mut [u8]) -> Result<Self, InstanceError> {
        let tier = Tier::from_size(bytes.len()).ok_or(InstanceError::UnknownSize(bytes.len()))?;
        Self::from_bytes(tier, bytes)
    }

    pub fn layout(&self) -> &'static LayoutSpec {
        self.layout
    }

    pub fn tier(&self) -> Tier {
        self.layout.tier
    }

    pub fn bytes(&self) -> &[u8] {
        &*self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    pub fn machine_id(&self) -> u32 {
        read_u32(&*self.bytes, MACHINE_ID)
    }

    pub fn set_machine_id(&mut self, id: u32) {
        write_u32(self.bytes, MACHINE_ID, id);
    }

    pub fn generation(&self) -> u16 {
        read_u16(&*self.bytes, GENERATION)
    }

    pub fn set_generation(&mut self, generation: u16) {
        write_u16(self.bytes, GENERATION, generation);
    }

    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_bits(self.bytes[STATUS])
    }

    pub fn insert_status(&mut self, flags: StatusFlags) {
        self.bytes[STATUS] |= flags.bits();
    }

    pub fn remove_status(&mut self, flags: StatusFlags) {
        self.bytes[STATUS] &= !flags.bits();
    }

    /// Raw phase byte; may be out of range on a corrupted instance.
    pub fn phase_raw(&self) -> u8 {
        self.bytes[PHASE]
    }

    pub fn phase(&self) -> Option<Phase> {
        Phase::from_u8(self.phase_raw())
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.bytes[PHASE] = phase as u8;
    }

    pub fn micro_step(&self) -> u8 {
        self.bytes[MICRO_STEP]
    }

    pub fn set_micro_step(&mut self, step: u8) {
        self.bytes[MICRO_STEP] = step;
    }

    pub fn rng_seed(&self) -> u32 {
        read_u32(&*self.bytes, RNG_SEED)
    }

    pub fn set_rng_seed(&mut self, seed: u32) {
        write_u32(self.bytes, RNG_SEED, seed);
    }

    /// In-place seed storage, so generators can advance it directly.
    pub fn seed_mut(&mut self) -> &mut [u8; 4] {
        self.bytes[RNG_SEED..]
            .first_chunk_mut::<4>()
            .expect("instance header holds a 4-byte seed")
    }

    pub fn leaf_capacity(&self) -> usize {
        self.layout.leaf_capacity as usize
    }

    pub fn leaf(&self, index: usize) -> u16 {
        assert!(index < self.leaf_capacity(), "leaf slot {index} out of range");
        read_u16(&*self.bytes, self.layout.leaf(index))
    }

    pub fn set_leaf(&mut self, index: usize, state: u16) {
        assert!(index < self.leaf_capacity(), "leaf slot {index} out of range");
        write_u16(self.bytes, self.layout.leaf(index), state);
    }

    /// False until the first tick has entered the default configuration.
    pub fn is_initialized(&self) -> bool {
        self.leaf(0) != NO_INDEX
    }

    /// Active leaves, in slot order. Slots are kept compact.
    pub fn active_leaves(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.leaf_capacity())
            .map(|i| self.leaf(i))
            .take_while(|&s| s != NO_INDEX)
    }

    pub fn leaf_count(&self) -> usize {
        self.active_leaves().count()
    }

    /// Mark every leaf slot uninitialized.
    pub fn clear_leaves(&mut self) {
        for i in 0..self.leaf_capacity() {
            self.set_leaf(i, NO_INDEX);
        }
    }

    pub fn timer_capacity(&self) -> usize {
        self.layout.timer_capacity as usize
    }

    pub fn timer(&self, slot: usize) -> u32 {
        assert!(slot < self.timer_capacity(), "timer slot {slot} out of range");
        read_u32(&*self.bytes, self.layout.timer(slot))
    }

    pub fn set_timer(&mut self, slot: usize, remaining_ms: u32) {
        assert!(slot < self.timer_capacity(), "timer slot {slot} out of range");
        write_u32(self.bytes, self.layout.timer(slot), remaining_ms);
    }

    pub fn clear_timers(&mut self) {
        for i in 0..self.timer_capacity() {
            self.set_timer(i, 0);
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.layout.history_capacity as usize
    }

    pub fn history(&self, slot: usize) -> u16 {
        assert!(slot < self.history_capacity(), "history slot {slot} out of range");
        read_u16(&*self.bytes, self.layout.history(slot))
    }

    pub fn set_history(&mut self, slot: usize, state: u16) {
        assert!(slot < self.history_capacity(), "history slot {slot} out of range");
        write_u16(self.bytes, self.layout.history(slot), state);
    }

    pub fn clear_history(&mut self) {
        for i in 0..self.history_capacity() {
            self.set_history(i, NO_INDEX);
        }
    }

    /// Fresh instance for `machine_id`: everything zeroed, slots marked
    /// empty, phase Idle.
    pub fn initialize(&mut self, machine_id: u32, seed: u32) {
        self.bytes.fill(0);
        self.set_machine_id(machine_id);
        self.set_rng_seed(seed);
        self.clear_leaves();
        self.clear_history();
        self.set_phase(Phase::Idle);
    }

    /// Restart the same machine. Keeps machine id and seed, bumps the
    /// generation, clears the rest.
    pub fn reset(&mut self) {
        let machine_id = self.machine_id();
        let seed = self.rng_seed();
        let generation = self.generation().wrapping_add(1);
        self.initialize(machine_id, seed);
        self.set_generation(generation);
    }

    /// Rebind to a structurally different machine. Only the generation
    /// survives (incremented).
    pub fn hard_reset(&mut self, machine_id: u32) {
        let generation = self.generation().wrapping_add(1);
        self.initialize(machine_id, 0);
        self.set_generation(generation);
    }

    pub(crate) fn queue_count_raw(&self) -> u8 {
        self.bytes[QUEUE_COUNT]
    }
}
