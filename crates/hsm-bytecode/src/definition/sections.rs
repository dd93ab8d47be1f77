//! Section packing: the single place that lays records out in blob order.

use super::header::Header;
use super::records::{EventDef, RegionDef, StateDef, TransitionDef};
use super::{HEADER_SIZE, MAGIC, VERSION};

/// Flat record arrays of one machine, in section order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sections {
    pub states: Vec<StateDef>,
    pub transitions: Vec<TransitionDef>,
    pub regions: Vec<RegionDef>,
    pub global_transitions: Vec<TransitionDef>,
    pub events: Vec<EventDef>,
    pub actions: Vec<u16>,
    pub guards: Vec<u16>,
}

impl Sections {
    /// Header for these sections, checksum left at zero.
    pub fn header(&self, structure_hash: u32, parameter_hash: u32) -> Header {
        Header {
            magic: MAGIC,
            version: VERSION,
            guard_count: count16(self.guards.len(), "guard ids"),
            structure_hash,
            parameter_hash,
            state_count: count16(self.states.len(), "states"),
            transition_count: count16(self.transitions.len(), "transitions"),
            region_count: count16(self.regions.len(), "regions"),
            global_transition_count: count16(
                self.global_transitions.len(),
                "global transitions",
            ),
            event_count: count16(self.events.len(), "events"),
            action_count: count16(self.actions.len(), "action ids"),
            checksum: 0,
        }
    }

    /// Pack header and sections into a blob. The header checksum is the
    /// CRC32 of every byte after the header.
    pub fn encode(&self, structure_hash: u32, parameter_hash: u32) -> Vec<u8> {
        let mut header = self.header(structure_hash, parameter_hash);
        let offsets = header.compute_offsets();

        let mut out = Vec::with_capacity(offsets.end);
        out.extend_from_slice(&[0u8; HEADER_SIZE]);
        for state in &self.states {
            out.extend_from_slice(&state.to_bytes());
        }
        for transition in &self.transitions {
            out.extend_from_slice(&transition.to_bytes());
        }
        for region in &self.regions {
            out.extend_from_slice(&region.to_bytes());
        }
        for global in &self.global_transitions {
            out.extend_from_slice(&global.to_bytes());
        }
        for event in &self.events {
            out.extend_from_slice(&event.to_bytes());
        }
        for id in self.actions.iter().chain(&self.guards) {
            out.extend_from_slice(&id.to_le_bytes());
        }
        debug_assert_eq!(out.len(), offsets.end);

        header.checksum = crc32fast::hash(&out[HEADER_SIZE..]);
        out[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        out
    }
}

fn count16(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len}"))
}
