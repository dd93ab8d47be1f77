//! Loaded definition blob.
//!
//! [`Definition`] owns the validated bytes and decodes records lazily. Record
//! accessors panic on out-of-range indices: a bad index means the blob and the
//! caller disagree about the machine, which is not recoverable.

use std::io;
use std::path::Path;

use crate::codec::read_u16;
use crate::tier::{Tier, select_tier};

use super::header::{Header, SectionOffsets};
use super::records::{EventDef, RegionDef, StateDef, TransitionDef};
use super::{
    EVENT_DEF_SIZE, HEADER_SIZE, ID_ENTRY_SIZE, NO_INDEX, REGION_DEF_SIZE, STATE_DEF_SIZE,
    TRANSITION_DEF_SIZE, VERSION,
};

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("invalid magic: expected FHSM")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u16),
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("size mismatch: header implies {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("checksum mismatch: header says {expected:#010x}, body is {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("definition has no root state")]
    MissingRoot,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Shape facts derived once at load time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapeSummary {
    /// States excluding the synthetic root.
    pub user_states: usize,
    pub max_depth: u8,
    pub history_slots: usize,
    pub timer_slots: usize,
    pub regions: usize,
    /// Worst-case number of simultaneously active leaves.
    pub max_leaves: usize,
}

impl ShapeSummary {
    /// Pure complexity tier, raised to whatever the leaf, timer and history
    /// counts need. Saturates at the largest tier.
    pub fn tier(&self) -> Tier {
        let base = select_tier(
            self.user_states,
            self.max_depth,
            self.history_slots,
            self.regions,
        );
        let leaves = Tier::for_leaves(self.max_leaves).unwrap_or(Tier::Tier256);
        let timers = Tier::for_timers(self.timer_slots).unwrap_or(Tier::Tier256);
        let history = Tier::for_history(self.history_slots).unwrap_or(Tier::Tier256);
        base.max(leaves).max(timers).max(history)
    }
}

/// A compiled, immutable state machine definition.
#[derive(Debug)]
pub struct Definition {
    bytes: Vec<u8>,
    header: Header,
    offsets: SectionOffsets,
    shape: ShapeSummary,
}

impl Definition {
    /// Load a definition from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ModuleError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ModuleError::FileTooSmall(bytes.len()));
        }

        let header = Header::from_bytes(&bytes[..HEADER_SIZE]);
        if !header.validate_magic() {
            return Err(ModuleError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(ModuleError::UnsupportedVersion(header.version));
        }

        let offsets = header.compute_offsets();
        if offsets.end != bytes.len() {
            return Err(ModuleError::SizeMismatch {
                expected: offsets.end,
                actual: bytes.len(),
            });
        }

        let actual = crc32fast::hash(&bytes[HEADER_SIZE..]);
        if actual != header.checksum {
            return Err(ModuleError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        if header.state_count == 0 {
            return Err(ModuleError::MissingRoot);
        }

        let mut definition = Self {
            bytes,
            header,
            offsets,
            shape: ShapeSummary::default(),
        };
        definition.shape = definition.compute_shape();
        Ok(definition)
    }

    /// Load a definition from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn offsets(&self) -> &SectionOffsets {
        &self.offsets
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn structure_hash(&self) -> u32 {
        self.header.structure_hash
    }

    pub fn parameter_hash(&self) -> u32 {
        self.header.parameter_hash
    }

    pub fn shape(&self) -> &ShapeSummary {
        &self.shape
    }

    /// Instance tier this definition runs in.
    pub fn tier(&self) -> Tier {
        self.shape.tier()
    }

    pub fn state_count(&self) -> u16 {
        self.header.state_count
    }

    pub fn transition_count(&self) -> u16 {
        self.header.transition_count
    }

    pub fn region_count(&self) -> u16 {
        self.header.region_count
    }

    pub fn global_transition_count(&self) -> u16 {
        self.header.global_transition_count
    }

    pub fn event_count(&self) -> u16 {
        self.header.event_count
    }

    #[inline]
    pub fn state(&self, index: u16) -> StateDef {
        ensure_index(index, self.header.state_count, "state");
        let at = self.offsets.states + index as usize * STATE_DEF_SIZE;
        StateDef::from_bytes(&self.bytes[at..at + STATE_DEF_SIZE])
    }

    #[inline]
    pub fn transition(&self, index: u16) -> TransitionDef {
        ensure_index(index, self.header.transition_count, "transition");
        let at = self.offsets.transitions + index as usize * TRANSITION_DEF_SIZE;
        TransitionDef::from_bytes(&self.bytes[at..at + TRANSITION_DEF_SIZE])
    }

    pub fn region(&self, index: u16) -> RegionDef {
        ensure_index(index, self.header.region_count, "region");
        let at = self.offsets.regions + index as usize * REGION_DEF_SIZE;
        RegionDef::from_bytes(&self.bytes[at..at + REGION_DEF_SIZE])
    }

    #[inline]
    pub fn global_transition(&self, index: u16) -> TransitionDef {
        ensure_index(
            index,
            self.header.global_transition_count,
            "global transition",
        );
        let at = self.offsets.global_transitions + index as usize * TRANSITION_DEF_SIZE;
        TransitionDef::from_bytes(&self.bytes[at..at + TRANSITION_DEF_SIZE])
    }

    pub fn event(&self, index: u16) -> EventDef {
        ensure_index(index, self.header.event_count, "event");
        let at = self.offsets.events + index as usize * EVENT_DEF_SIZE;
        EventDef::from_bytes(&self.bytes[at..at + EVENT_DEF_SIZE])
    }

    /// Event table entry for an event id, if declared.
    pub fn event_def(&self, id: u16) -> Option<EventDef> {
        (0..self.header.event_count)
            .map(|i| self.event(i))
            .find(|e| e.id == id)
    }

    pub fn action_id(&self, index: u16) -> u16 {
        ensure_index(index, self.header.action_count, "action id");
        read_u16(&self.bytes, self.offsets.actions + index as usize * ID_ENTRY_SIZE)
    }

    pub fn guard_id(&self, index: u16) -> u16 {
        ensure_index(index, self.header.guard_count, "guard id");
        read_u16(&self.bytes, self.offsets.guards + index as usize * ID_ENTRY_SIZE)
    }

    pub fn action_ids(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.header.action_count).map(|i| self.action_id(i))
    }

    pub fn guard_ids(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.header.guard_count).map(|i| self.guard_id(i))
    }

    pub fn states(&self) -> impl Iterator<Item = (u16, StateDef)> + '_ {
        (0..self.header.state_count).map(|i| (i, self.state(i)))
    }

    pub fn global_transitions(&self) -> impl Iterator<Item = (u16, TransitionDef)> + '_ {
        (0..self.header.global_transition_count).map(|i| (i, self.global_transition(i)))
    }

    pub fn parent(&self, state: u16) -> u16 {
        self.state(state).parent
    }

    /// True if `ancestor` is `state` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: u16, state: u16) -> bool {
        let mut cur = state;
        while cur != NO_INDEX {
            if cur == ancestor {
                return true;
            }
            cur = self.parent(cur);
        }
        false
    }

    /// Root-to-state chain written into `buf`; returns its length.
    ///
    /// `buf` must hold at least `depth + 1` entries.
    pub fn ancestor_chain(&self, state: u16, buf: &mut [u16]) -> usize {
        let depth = self.state(state).depth as usize;
        assert!(buf.len() > depth, "ancestor buffer too small for depth {depth}");
        let mut cur = state;
        for slot in buf[..=depth].iter_mut().rev() {
            *slot = cur;
            cur = self.parent(cur);
        }
        depth + 1
    }

    fn compute_shape(&self) -> ShapeSummary {
        let count = self.header.state_count;
        let mut leaves = vec![0usize; count as usize];
        let mut shape = ShapeSummary {
            user_states: count as usize - 1,
            regions: self.header.region_count as usize,
            ..ShapeSummary::default()
        };

        // Children always have larger indices than their parent.
        for index in (0..count).rev() {
            let state = self.state(index);
            shape.max_depth = shape.max_depth.max(state.depth);
            if state.history_slot != NO_INDEX {
                shape.history_slots = shape.history_slots.max(state.history_slot as usize + 1);
            }
            if state.has_timer() {
                shape.timer_slots = shape.timer_slots.max(state.timer_slot as usize + 1);
            }
            leaves[index as usize] = if state.is_leaf() {
                1
            } else {
                let children = state.children().map(|c| leaves[c as usize]);
                if state.is_parallel() {
                    children.sum()
                } else {
                    children.max().unwrap_or(1)
                }
            };
        }

        shape.max_leaves = leaves[0].max(1);
        shape
    }
}

#[inline]
fn ensure_index(index: u16, count: u16, what: &str) {
    assert!(
        index < count,
        "{what} index {index} out of range (count {count})"
    );
}
