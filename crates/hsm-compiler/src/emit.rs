//! Content hashes and blob packing.
//!
//! Both hashes are SHA-256 over a canonical little-endian byte stream,
//! truncated to the first four bytes. Names never enter either stream.

use hsm_bytecode::{Sections, StateFlags};
use sha2::{Digest, Sha256};

/// Topology only: parent/child links, depth, composite/parallel/history
/// flags. Stable under renaming; also the machine id stamped on instances.
pub fn structure_hash(sections: &Sections) -> u32 {
    let mut h = Sha256::new();
    h.update((sections.states.len() as u32).to_le_bytes());
    for s in &sections.states {
        h.update(s.parent.to_le_bytes());
        h.update(s.first_child.to_le_bytes());
        h.update(s.child_count.to_le_bytes());
        h.update([s.depth, s.flags.intersection(StateFlags::TOPOLOGY).bits()]);
    }
    truncate(h)
}

/// Behavior wiring: actions, guards, events, transitions, timers, lanes.
pub fn parameter_hash(sections: &Sections) -> u32 {
    let wiring = StateFlags::INITIAL.union(StateFlags::HAS_TIMER);
    let mut h = Sha256::new();
    for s in &sections.states {
        for v in [
            s.entry_action,
            s.exit_action,
            s.activity_action,
            s.timer_action,
            s.timer_ms,
            s.timer_slot,
            s.history_slot,
            s.initial_child,
            s.transition_start,
            s.transition_count,
        ] {
            h.update(v.to_le_bytes());
        }
        h.update([s.flags.intersection(wiring).bits(), s.output_lanes]);
    }
    h.update((sections.transitions.len() as u32).to_le_bytes());
    for t in &sections.transitions {
        h.update(t.to_bytes());
    }
    h.update((sections.global_transitions.len() as u32).to_le_bytes());
    for t in &sections.global_transitions {
        h.update(t.to_bytes());
    }
    h.update((sections.events.len() as u32).to_le_bytes());
    for e in &sections.events {
        h.update(e.to_bytes());
    }
    truncate(h)
}

/// Hash and pack into an immutable blob.
pub fn emit(sections: &Sections) -> Vec<u8> {
    sections.encode(structure_hash(sections), parameter_hash(sections))
}

fn truncate(h: Sha256) -> u32 {
    let digest = h.finalize();
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}
