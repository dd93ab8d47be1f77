use crate::event::{EventFlags, EventPriority};

use super::{
    EventDef, NO_INDEX, RegionDef, STATE_DEF_SIZE, StateDef, StateFlags, TRANSITION_DEF_SIZE,
    TransitionDef, TransitionFlags,
};

#[test]
fn state_def_layout() {
    let state = StateDef {
        parent: 1,
        first_child: 2,
        child_count: 3,
        transition_start: 4,
        transition_count: 5,
        depth: 6,
        region_count: 7,
        entry_action: 0x0808,
        exit_action: 0x0909,
        activity_action: 0x0A0A,
        flags: StateFlags::COMPOSITE.union(StateFlags::HISTORY),
        output_lanes: 0b0000_0110,
        history_slot: 11,
        timer_slot: 12,
        region_start: 13,
        initial_child: 14,
        timer_action: 0x0F0F,
        timer_ms: 1000,
    };

    let bytes = state.to_bytes();
    assert_eq!(bytes.len(), STATE_DEF_SIZE);
    assert_eq!(&bytes[10..12], &[6, 7]);
    // Flags word: low byte state flags, high byte output lanes.
    assert_eq!(&bytes[18..20], &[0b0000_0101, 0b0000_0110]);
    assert_eq!(&bytes[30..32], &1000u16.to_le_bytes());
    assert_eq!(StateDef::from_bytes(&bytes), state);
}

#[test]
fn state_def_defaults_use_sentinels() {
    let state = StateDef::default();
    assert_eq!(state.parent, NO_INDEX);
    assert_eq!(state.history_slot, NO_INDEX);
    assert_eq!(state.timer_slot, NO_INDEX);
    assert!(state.is_leaf());
    assert!(!state.has_timer());
    assert_eq!(state.children(), 0..0);
    assert_eq!(state.transitions(), 0..0);
}

#[test]
fn state_ranges() {
    let state = StateDef {
        first_child: 4,
        child_count: 3,
        transition_start: 10,
        transition_count: 2,
        ..StateDef::default()
    };
    assert_eq!(state.children(), 4..7);
    assert_eq!(state.transitions(), 10..12);
}

#[test]
fn transition_flags_share_word_with_priority() {
    let mut flags = TransitionFlags::empty();
    flags.insert(TransitionFlags::INTERNAL);
    let t = TransitionDef {
        source: 1,
        target: 2,
        event: 3,
        sync_group: 4,
        guard: 5,
        action: 6,
        flags,
        priority: 15,
        cost: 9,
    };

    let bytes = t.to_bytes();
    assert_eq!(bytes.len(), TRANSITION_DEF_SIZE);
    assert_eq!(&bytes[12..14], &[0x1F, 0x00]);

    let back = TransitionDef::from_bytes(&bytes);
    assert_eq!(back, t);
    assert!(back.is_internal());
    assert!(!back.is_global());
}

#[test]
fn priority_is_masked_to_four_bits() {
    let t = TransitionDef {
        priority: 0x1F,
        ..TransitionDef::default()
    };
    let back = TransitionDef::from_bytes(&t.to_bytes());
    assert_eq!(back.priority, 15);
    assert_eq!(back.flags, TransitionFlags::empty());
}

#[test]
fn region_and_event_records() {
    let region = RegionDef {
        owner: 1,
        root: 2,
        index: 1,
        state_count: 4,
    };
    assert_eq!(region.to_bytes(), [1, 0, 2, 0, 1, 0, 4, 0]);
    assert_eq!(RegionDef::from_bytes(&region.to_bytes()), region);

    let mut flags = EventFlags::empty();
    flags.insert(EventFlags::DEFERRED);
    let event = EventDef {
        id: 0x0102,
        flags,
        priority: EventPriority::Interrupt,
    };
    assert_eq!(event.to_bytes(), [0x02, 0x01, 1, 2]);
    assert_eq!(EventDef::from_bytes(&event.to_bytes()), event);
}
