//! Fixed-capacity ring of packed trace records.
//!
//! Record layout (16 bytes, little-endian):
//!
//! ```text
//! opcode u8 | aux u8 | tick u16 | instance u32 | args [u16; 4]
//! ```
//!
//! `aux` carries small opcode-specific data (action kind, guard result,
//! conflicting lanes).

use hsm_bytecode::HsmEvent;

use super::{ActionKind, Tracer};

pub const RECORD_SIZE: usize = 16;

/// Trace categories, as bit flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceLevel(u8);

impl TraceLevel {
    /// Events, transitions, state enter/exit, errors.
    pub const TIER1: Self = Self(1 << 0);
    /// Actions and timers.
    pub const TIER2: Self = Self(1 << 1);
    /// Guards, activities, lane conflicts.
    pub const TIER3: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Tiers 1 through `tier`, clamped to 1..=3.
    pub const fn up_to(tier: u8) -> Self {
        match tier {
            0 | 1 => Self::TIER1,
            2 => Self::TIER1.union(Self::TIER2),
            _ => Self::ALL,
        }
    }
}

impl Default for TraceLevel {
    fn default() -> Self {
        Self::TIER1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TraceOpcode {
    Event = 1,
    EventDropped = 2,
    Transition = 3,
    Enter = 4,
    Exit = 5,
    RtcOverflow = 6,
    LeafOverflow = 7,
    Action = 8,
    TimerArmed = 9,
    TimerFired = 10,
    Guard = 11,
    Activity = 12,
    Conflict = 13,
}

impl TraceOpcode {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            1 => Self::Event,
            2 => Self::EventDropped,
            3 => Self::Transition,
            4 => Self::Enter,
            5 => Self::Exit,
            6 => Self::RtcOverflow,
            7 => Self::LeafOverflow,
            8 => Self::Action,
            9 => Self::TimerArmed,
            10 => Self::TimerFired,
            11 => Self::Guard,
            12 => Self::Activity,
            13 => Self::Conflict,
            _ => return None,
        })
    }

    pub fn level(self) -> TraceLevel {
        match self {
            Self::Event
            | Self::EventDropped
            | Self::Transition
            | Self::Enter
            | Self::Exit
            | Self::RtcOverflow
            | Self::LeafOverflow => TraceLevel::TIER1,
            Self::Action | Self::TimerArmed | Self::TimerFired => TraceLevel::TIER2,
            Self::Guard | Self::Activity | Self::Conflict => TraceLevel::TIER3,
        }
    }
}

/// One decoded trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub opcode: TraceOpcode,
    pub aux: u8,
    /// Low 16 bits of the tick counter at write time.
    pub tick: u16,
    pub instance: u32,
    pub args: [u16; 4],
}

impl TraceRecord {
    pub fn new(opcode: TraceOpcode, instance: u32) -> Self {
        Self {
            opcode,
            aux: 0,
            tick: 0,
            instance,
            args: [0; 4],
        }
    }

    fn aux(mut self, aux: u8) -> Self {
        self.aux = aux;
        self
    }

    fn args(mut self, args: [u16; 4]) -> Self {
        self.args = args;
        self
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut b = [0u8; RECORD_SIZE];
        b[0] = self.opcode as u8;
        b[1] = self.aux;
        b[2..4].copy_from_slice(&self.tick.to_le_bytes());
        b[4..8].copy_from_slice(&self.instance.to_le_bytes());
        for (i, arg) in self.args.iter().enumerate() {
            let at = 8 + i * 2;
            b[at..at + 2].copy_from_slice(&arg.to_le_bytes());
        }
        b
    }

    /// `None` for an unknown opcode.
    pub fn from_bytes(b: &[u8; RECORD_SIZE]) -> Option<Self> {
        let arg = |i: usize| u16::from_le_bytes([b[8 + i * 2], b[9 + i * 2]]);
        Some(Self {
            opcode: TraceOpcode::from_u8(b[0])?,
            aux: b[1],
            tick: u16::from_le_bytes([b[2], b[3]]),
            instance: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
            args: [arg(0), arg(1), arg(2), arg(3)],
        })
    }
}

/// Ring buffer tracer. Once full, each write replaces the oldest record.
#[derive(Debug)]
pub struct TraceBuffer {
    slots: Box<[[u8; RECORD_SIZE]]>,
    /// Next slot to write.
    head: usize,
    len: usize,
    level: TraceLevel,
    tick: u16,
    written: u64,
}

impl TraceBuffer {
    /// Ring of `capacity` records (at least one) filtered by `level`.
    pub fn new(capacity: usize, level: TraceLevel) -> Self {
        Self {
            slots: vec![[0u8; RECORD_SIZE]; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
            level,
            tick: 0,
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn level(&self) -> TraceLevel {
        self.level
    }

    pub fn set_level(&mut self, level: TraceLevel) {
        self.level = level;
    }

    /// Stamp subsequent records with `tick`.
    pub fn set_tick(&mut self, tick: u32) {
        self.tick = tick as u16;
    }

    /// Records lost to wrap-around.
    pub fn overwritten(&self) -> u64 {
        self.written - self.len as u64
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.written = 0;
    }

    /// Raw slot bytes, oldest first.
    pub fn raw(&self) -> impl Iterator<Item = &[u8; RECORD_SIZE]> + '_ {
        let cap = self.capacity();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| &self.slots[(start + i) % cap])
    }

    /// Decoded records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        self.raw().filter_map(TraceRecord::from_bytes)
    }

    pub fn push(&mut self, mut record: TraceRecord) {
        if !self.level.contains(record.opcode.level()) {
            return;
        }
        record.tick = self.tick;
        self.slots[self.head] = record.to_bytes();
        self.head = (self.head + 1) % self.capacity();
        self.len = (self.len + 1).min(self.capacity());
        self.written += 1;
    }
}

impl Tracer for TraceBuffer {
    fn trace_event(&mut self, instance: u32, event: &HsmEvent) {
        let priority = event.priority as u16;
        self.push(TraceRecord::new(TraceOpcode::Event, instance).args([event.id, priority, 0, 0]));
    }

    fn trace_event_dropped(&mut self, instance: u32, event: u16) {
        self.push(TraceRecord::new(TraceOpcode::EventDropped, instance).args([event, 0, 0, 0]));
    }

    fn trace_transition(&mut self, instance: u32, source: u16, target: u16, event: u16) {
        self.push(
            TraceRecord::new(TraceOpcode::Transition, instance).args([source, target, event, 0]),
        );
    }

    fn trace_enter(&mut self, instance: u32, state: u16) {
        self.push(TraceRecord::new(TraceOpcode::Enter, instance).args([state, 0, 0, 0]));
    }

    fn trace_exit(&mut self, instance: u32, state: u16) {
        self.push(TraceRecord::new(TraceOpcode::Exit, instance).args([state, 0, 0, 0]));
    }

    fn trace_action(&mut self, instance: u32, kind: ActionKind, action: u16, state: u16) {
        self.push(
            TraceRecord::new(TraceOpcode::Action, instance)
                .aux(kind as u8)
                .args([action, state, 0, 0]),
        );
    }

    fn trace_activity(&mut self, instance: u32, action: u16, state: u16) {
        self.push(TraceRecord::new(TraceOpcode::Activity, instance).args([action, state, 0, 0]));
    }

    fn trace_guard(&mut self, instance: u32, guard: u16, event: u16, passed: bool) {
        self.push(
            TraceRecord::new(TraceOpcode::Guard, instance)
                .aux(passed as u8)
                .args([guard, event, 0, 0]),
        );
    }

    fn trace_timer_armed(&mut self, instance: u32, slot: u16, state: u16, duration_ms: u16) {
        self.push(
            TraceRecord::new(TraceOpcode::TimerArmed, instance)
                .args([slot, state, duration_ms, 0]),
        );
    }

    fn trace_timer_fired(&mut self, instance: u32, slot: u16, state: u16) {
        self.push(TraceRecord::new(TraceOpcode::TimerFired, instance).args([slot, state, 0, 0]));
    }

    fn trace_conflict(&mut self, instance: u32, lanes: u8, winner: u16, loser: u16) {
        self.push(
            TraceRecord::new(TraceOpcode::Conflict, instance)
                .aux(lanes)
                .args([winner, loser, 0, 0]),
        );
    }

    fn trace_rtc_overflow(&mut self, instance: u32, steps: u16) {
        self.push(TraceRecord::new(TraceOpcode::RtcOverflow, instance).args([steps, 0, 0, 0]));
    }

    fn trace_leaf_overflow(&mut self, instance: u32, state: u16) {
        self.push(TraceRecord::new(TraceOpcode::LeafOverflow, instance).args([state, 0, 0, 0]));
    }
}
