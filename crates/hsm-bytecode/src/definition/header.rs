//! Definition header (32 bytes).
//!
//! - 0-3: magic
//! - 4-7: version (u16), guard table count (u16)
//! - 8-15: structure hash, parameter hash (u32 each)
//! - 16-27: counts (6 × u16), order matches section order
//! - 28-31: CRC32 of everything after the header

use super::{
    EVENT_DEF_SIZE, HEADER_SIZE, ID_ENTRY_SIZE, MAGIC, REGION_DEF_SIZE, STATE_DEF_SIZE,
    TRANSITION_DEF_SIZE, VERSION,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: b"FHSM"
    pub magic: [u8; 4],
    pub version: u16,
    pub guard_count: u16,
    /// Topology-only digest. Doubles as the machine id stamped on instances.
    pub structure_hash: u32,
    /// Action/guard/event wiring digest.
    pub parameter_hash: u32,

    pub state_count: u16,
    pub transition_count: u16,
    pub region_count: u16,
    pub global_transition_count: u16,
    pub event_count: u16,
    pub action_count: u16,

    pub checksum: u32,
}

const _: () = assert!(HEADER_SIZE == 32);

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            guard_count: 0,
            structure_hash: 0,
            parameter_hash: 0,
            state_count: 0,
            transition_count: 0,
            region_count: 0,
            global_transition_count: 0,
            event_count: 0,
            action_count: 0,
            checksum: 0,
        }
    }
}

/// Byte offsets of each section, derived from the header counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub states: usize,
    pub transitions: usize,
    pub regions: usize,
    pub global_transitions: usize,
    pub events: usize,
    pub actions: usize,
    pub guards: usize,
    /// One past the last byte; the expected blob size.
    pub end: usize,
}

impl Header {
    /// Decode header from the first 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let u16_at = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);
        let u32_at =
            |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u16_at(4),
            guard_count: u16_at(6),
            structure_hash: u32_at(8),
            parameter_hash: u32_at(12),
            state_count: u16_at(16),
            transition_count: u16_at(18),
            region_count: u16_at(20),
            global_transition_count: u16_at(22),
            event_count: u16_at(24),
            action_count: u16_at(26),
            checksum: u32_at(28),
        }
    }

    /// Encode header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.guard_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.structure_hash.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.parameter_hash.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.state_count.to_le_bytes());
        bytes[18..20].copy_from_slice(&self.transition_count.to_le_bytes());
        bytes[20..22].copy_from_slice(&self.region_count.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.global_transition_count.to_le_bytes());
        bytes[24..26].copy_from_slice(&self.event_count.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.action_count.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    /// Compute section offsets from counts. Sections are packed back to
    /// back; every record size divides the one before it, so records stay
    /// naturally aligned up to the global transition table.
    pub fn compute_offsets(&self) -> SectionOffsets {
        let states = HEADER_SIZE;
        let transitions = states + self.state_count as usize * STATE_DEF_SIZE;
        let regions = transitions + self.transition_count as usize * TRANSITION_DEF_SIZE;
        let global_transitions = regions + self.region_count as usize * REGION_DEF_SIZE;
        let events =
            global_transitions + self.global_transition_count as usize * TRANSITION_DEF_SIZE;
        let actions = events + self.event_count as usize * EVENT_DEF_SIZE;
        let guards = actions + self.action_count as usize * ID_ENTRY_SIZE;
        let end = guards + self.guard_count as usize * ID_ENTRY_SIZE;

        SectionOffsets {
            states,
            transitions,
            regions,
            global_transitions,
            events,
            actions,
            guards,
            end,
        }
    }
}
