//! Physical layouts of the three instance tiers.
//!
//! Every tier opens with the same 16-byte header:
//!
//! - 0-3: machine id (structure hash of the definition)
//! - 4-5: generation
//! - 6: status flags
//! - 7: phase
//! - 8: micro step
//! - 9-11: ring head, ring tail, ring count
//! - 12-15: RNG seed

use crate::event::EVENT_SIZE;
use crate::tier::Tier;

pub const INSTANCE_HEADER_SIZE: usize = 16;

pub(crate) const MACHINE_ID: usize = 0;
pub(crate) const GENERATION: usize = 4;
pub(crate) const STATUS: usize = 6;
pub(crate) const PHASE: usize = 7;
pub(crate) const MICRO_STEP: usize = 8;
pub(crate) const QUEUE_HEAD: usize = 9;
pub(crate) const QUEUE_TAIL: usize = 10;
pub(crate) const QUEUE_COUNT: usize = 11;
pub(crate) const RNG_SEED: usize = 12;

/// Byte offsets and capacities of one tier.
#[derive(Debug, PartialEq, Eq)]
pub struct LayoutSpec {
    pub tier: Tier,
    pub size: usize,
    /// Active leaf state indices, u16 each.
    pub leaf_offset: usize,
    pub leaf_capacity: u8,
    /// Remaining milliseconds per timer slot, u32 each. Zero means unarmed.
    pub timer_offset: usize,
    pub timer_capacity: u8,
    /// Saved descendant per history slot, u16 each.
    pub history_offset: usize,
    pub history_capacity: u8,
    /// Dedicated interrupt slot. Tier 64 has none: its single slot is
    /// shared and arbitrated by priority.
    pub interrupt_offset: Option<usize>,
    pub ring_offset: usize,
    pub ring_capacity: u8,
}

impl LayoutSpec {
    pub fn for_tier(tier: Tier) -> &'static LayoutSpec {
        match tier {
            Tier::Tier64 => &LAYOUT_64,
            Tier::Tier128 => &LAYOUT_128,
            Tier::Tier256 => &LAYOUT_256,
        }
    }

    pub(crate) fn ring_slot(&self, index: u8) -> usize {
        self.ring_offset + index as usize * EVENT_SIZE
    }

    pub(crate) fn leaf(&self, index: usize) -> usize {
        self.leaf_offset + index * 2
    }

    pub(crate) fn timer(&self, index: usize) -> usize {
        self.timer_offset + index * 4
    }

    pub(crate) fn history(&self, index: usize) -> usize {
        self.history_offset + index * 2
    }

    /// One past the last byte in use.
    pub fn used(&self) -> usize {
        self.ring_slot(self.ring_capacity)
    }
}

pub static LAYOUT_64: LayoutSpec = LayoutSpec {
    tier: Tier::Tier64,
    size: 64,
    leaf_offset: 16,
    leaf_capacity: 2,
    timer_offset: 20,
    timer_capacity: 2,
    history_offset: 28,
    history_capacity: 2,
    interrupt_offset: None,
    ring_offset: 32,
    ring_capacity: 1,
};

pub static LAYOUT_128: LayoutSpec = LayoutSpec {
    tier: Tier::Tier128,
    size: 128,
    leaf_offset: 16,
    leaf_capacity: 4,
    timer_offset: 24,
    timer_capacity: 4,
    history_offset: 40,
    history_capacity: 8,
    interrupt_offset: Some(56),
    ring_offset: 80,
    ring_capacity: 1,
};

pub static LAYOUT_256: LayoutSpec = LayoutSpec {
    tier: Tier::Tier256,
    size: 256,
    leaf_offset: 16,
    leaf_capacity: 8,
    timer_offset: 32,
    timer_capacity: 8,
    history_offset: 64,
    history_capacity: 16,
    interrupt_offset: Some(96),
    ring_offset: 120,
    ring_capacity: 5,
};
