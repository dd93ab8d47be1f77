//! Fixed-width ROM records.

use crate::codec::{read_u16, write_u16};
use crate::event::{EventFlags, EventPriority};

use super::{EVENT_DEF_SIZE, NO_INDEX, REGION_DEF_SIZE, STATE_DEF_SIZE, TRANSITION_DEF_SIZE};

/// State flags, stored in the low byte of the StateDef flags word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateFlags(u8);

impl StateFlags {
    pub const COMPOSITE: Self = Self(1 << 0);
    pub const PARALLEL: Self = Self(1 << 1);
    pub const HISTORY: Self = Self(1 << 2);
    pub const DEEP_HISTORY: Self = Self(1 << 3);
    pub const INITIAL: Self = Self(1 << 4);
    pub const HAS_TIMER: Self = Self(1 << 5);

    /// Flags that describe topology (covered by the structure hash).
    pub const TOPOLOGY: Self =
        Self(Self::COMPOSITE.0 | Self::PARALLEL.0 | Self::HISTORY.0 | Self::DEEP_HISTORY.0);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

/// Flattened state (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateDef {
    pub parent: u16,
    pub first_child: u16,
    pub child_count: u16,
    pub transition_start: u16,
    pub transition_count: u16,
    pub depth: u8,
    pub region_count: u8,
    pub entry_action: u16,
    pub exit_action: u16,
    pub activity_action: u16,
    pub flags: StateFlags,
    /// Output lanes claimed by this state's side effects when it is an
    /// active leaf.
    pub output_lanes: u8,
    pub history_slot: u16,
    pub timer_slot: u16,
    pub region_start: u16,
    pub initial_child: u16,
    pub timer_action: u16,
    pub timer_ms: u16,
}

impl Default for StateDef {
    fn default() -> Self {
        Self {
            parent: NO_INDEX,
            first_child: NO_INDEX,
            child_count: 0,
            transition_start: NO_INDEX,
            transition_count: 0,
            depth: 0,
            region_count: 0,
            entry_action: 0,
            exit_action: 0,
            activity_action: 0,
            flags: StateFlags::empty(),
            output_lanes: 0,
            history_slot: NO_INDEX,
            timer_slot: NO_INDEX,
            region_start: NO_INDEX,
            initial_child: NO_INDEX,
            timer_action: 0,
            timer_ms: 0,
        }
    }
}

impl StateDef {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= STATE_DEF_SIZE, "state record too short");
        let flags_word = read_u16(bytes, 18);
        Self {
            parent: read_u16(bytes, 0),
            first_child: read_u16(bytes, 2),
            child_count: read_u16(bytes, 4),
            transition_start: read_u16(bytes, 6),
            transition_count: read_u16(bytes, 8),
            depth: bytes[10],
            region_count: bytes[11],
            entry_action: read_u16(bytes, 12),
            exit_action: read_u16(bytes, 14),
            activity_action: read_u16(bytes, 16),
            flags: StateFlags::from_bits(flags_word as u8),
            output_lanes: (flags_word >> 8) as u8,
            history_slot: read_u16(bytes, 20),
            timer_slot: read_u16(bytes, 22),
            region_start: read_u16(bytes, 24),
            initial_child: read_u16(bytes, 26),
            timer_action: read_u16(bytes, 28),
            timer_ms: read_u16(bytes, 30),
        }
    }

    pub fn to_bytes(&self) -> [u8; STATE_DEF_SIZE] {
        let mut b = [0u8; STATE_DEF_SIZE];
        write_u16(&mut b, 0, self.parent);
        write_u16(&mut b, 2, self.first_child);
        write_u16(&mut b, 4, self.child_count);
        write_u16(&mut b, 6, self.transition_start);
        write_u16(&mut b, 8, self.transition_count);
        b[10] = self.depth;
        b[11] = self.region_count;
        write_u16(&mut b, 12, self.entry_action);
        write_u16(&mut b, 14, self.exit_action);
        write_u16(&mut b, 16, self.activity_action);
        let flags_word = self.flags.bits() as u16 | (self.output_lanes as u16) << 8;
        write_u16(&mut b, 18, flags_word);
        write_u16(&mut b, 20, self.history_slot);
        write_u16(&mut b, 22, self.timer_slot);
        write_u16(&mut b, 24, self.region_start);
        write_u16(&mut b, 26, self.initial_child);
        write_u16(&mut b, 28, self.timer_action);
        write_u16(&mut b, 30, self.timer_ms);
        b
    }

    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    pub fn is_composite(&self) -> bool {
        self.flags.contains(StateFlags::COMPOSITE)
    }

    pub fn is_parallel(&self) -> bool {
        self.flags.contains(StateFlags::PARALLEL)
    }

    pub fn is_history(&self) -> bool {
        self.flags.contains(StateFlags::HISTORY)
    }

    pub fn is_deep_history(&self) -> bool {
        self.flags.contains(StateFlags::DEEP_HISTORY)
    }

    pub fn has_timer(&self) -> bool {
        self.flags.contains(StateFlags::HAS_TIMER) && self.timer_slot != NO_INDEX
    }

    /// Children occupy a contiguous run of flat indices.
    pub fn children(&self) -> std::ops::Range<u16> {
        if self.child_count == 0 {
            return 0..0;
        }
        self.first_child..self.first_child + self.child_count
    }

    pub fn transitions(&self) -> std::ops::Range<u16> {
        if self.transition_count == 0 {
            return 0..0;
        }
        self.transition_start..self.transition_start + self.transition_count
    }
}

/// Transition flags, stored above the 4 priority bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TransitionFlags(u16);

impl TransitionFlags {
    /// No exit/entry; only the transition action runs.
    pub const INTERNAL: Self = Self(1 << 4);
    /// Record lives in the global transition table.
    pub const GLOBAL: Self = Self(1 << 5);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & !0x000F)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Flattened transition (16 bytes). Also used for global transitions, whose
/// source is [`NO_INDEX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionDef {
    pub source: u16,
    pub target: u16,
    pub event: u16,
    pub sync_group: u16,
    pub guard: u16,
    pub action: u16,
    pub flags: TransitionFlags,
    /// 0..=15, higher wins.
    pub priority: u8,
    /// Exit steps + entry steps.
    pub cost: u16,
}

impl Default for TransitionDef {
    fn default() -> Self {
        Self {
            source: NO_INDEX,
            target: NO_INDEX,
            event: 0,
            sync_group: 0,
            guard: 0,
            action: 0,
            flags: TransitionFlags::empty(),
            priority: 0,
            cost: 0,
        }
    }
}

impl TransitionDef {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= TRANSITION_DEF_SIZE, "transition record too short");
        let packed = read_u16(bytes, 12);
        Self {
            source: read_u16(bytes, 0),
            target: read_u16(bytes, 2),
            event: read_u16(bytes, 4),
            sync_group: read_u16(bytes, 6),
            guard: read_u16(bytes, 8),
            action: read_u16(bytes, 10),
            flags: TransitionFlags::from_bits(packed),
            priority: (packed & 0x000F) as u8,
            cost: read_u16(bytes, 14),
        }
    }

    pub fn to_bytes(&self) -> [u8; TRANSITION_DEF_SIZE] {
        let mut b = [0u8; TRANSITION_DEF_SIZE];
        write_u16(&mut b, 0, self.source);
        write_u16(&mut b, 2, self.target);
        write_u16(&mut b, 4, self.event);
        write_u16(&mut b, 6, self.sync_group);
        write_u16(&mut b, 8, self.guard);
        write_u16(&mut b, 10, self.action);
        write_u16(&mut b, 12, self.flags.bits() | (self.priority as u16 & 0x000F));
        write_u16(&mut b, 14, self.cost);
        b
    }

    pub fn is_internal(&self) -> bool {
        self.flags.contains(TransitionFlags::INTERNAL)
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains(TransitionFlags::GLOBAL)
    }
}

/// One orthogonal region of a parallel state (8 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionDef {
    /// The parallel state owning this region.
    pub owner: u16,
    /// Top state of the region (a direct child of `owner`).
    pub root: u16,
    /// Position among the owner's regions.
    pub index: u16,
    /// States in the region subtree, `root` included.
    pub state_count: u16,
}

impl RegionDef {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= REGION_DEF_SIZE, "region record too short");
        Self {
            owner: read_u16(bytes, 0),
            root: read_u16(bytes, 2),
            index: read_u16(bytes, 4),
            state_count: read_u16(bytes, 6),
        }
    }

    pub fn to_bytes(&self) -> [u8; REGION_DEF_SIZE] {
        let mut b = [0u8; REGION_DEF_SIZE];
        write_u16(&mut b, 0, self.owner);
        write_u16(&mut b, 2, self.root);
        write_u16(&mut b, 4, self.index);
        write_u16(&mut b, 6, self.state_count);
        b
    }
}

/// Event table entry (4 bytes): defaults applied when posting by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventDef {
    pub id: u16,
    pub flags: EventFlags,
    pub priority: EventPriority,
}

impl EventDef {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= EVENT_DEF_SIZE, "event record too short");
        Self {
            id: read_u16(bytes, 0),
            flags: EventFlags::from_bits(bytes[2]),
            priority: EventPriority::from_u8(bytes[3]),
        }
    }

    pub fn to_bytes(&self) -> [u8; EVENT_DEF_SIZE] {
        let mut b = [0u8; EVENT_DEF_SIZE];
        write_u16(&mut b, 0, self.id);
        b[2] = self.flags.bits();
        b[3] = self.priority as u8;
        b
    }
}
