//! Hand-assembled definitions for bytecode-level tests.

use crate::event::{EventFlags, EventPriority};

use super::{
    EventDef, NO_INDEX, RegionDef, Sections, StateDef, StateFlags, TransitionDef, TransitionFlags,
};

/// `Idle --E2 [guard]/action--> Busy --timer--> Idle`, Busy has a 500ms timer.
pub fn two_state_sections() -> Sections {
    let root = StateDef {
        first_child: 1,
        child_count: 2,
        flags: StateFlags::COMPOSITE,
        initial_child: 1,
        ..StateDef::default()
    };
    let idle = StateDef {
        parent: 0,
        depth: 1,
        flags: StateFlags::INITIAL,
        entry_action: 0x3333,
        transition_start: 0,
        transition_count: 1,
        ..StateDef::default()
    };
    let busy = StateDef {
        parent: 0,
        depth: 1,
        flags: StateFlags::HAS_TIMER,
        timer_slot: 0,
        timer_ms: 500,
        activity_action: 0x3333,
        transition_start: 1,
        transition_count: 1,
        ..StateDef::default()
    };

    Sections {
        states: vec![root, idle, busy],
        transitions: vec![
            TransitionDef {
                source: 1,
                target: 2,
                event: 2,
                guard: 0x2222,
                action: 0x1111,
                priority: 3,
                cost: 2,
                ..TransitionDef::default()
            },
            TransitionDef {
                source: 2,
                target: 1,
                event: hsm_core::EVENT_TIMER,
                cost: 2,
                ..TransitionDef::default()
            },
        ],
        events: vec![EventDef {
            id: 2,
            flags: EventFlags::empty(),
            priority: EventPriority::Normal,
        }],
        actions: vec![0x1111, 0x3333],
        guards: vec![0x2222],
        ..Sections::default()
    }
}

/// Parallel root child with two regions of two leaves each, plus a global
/// reset transition.
pub fn parallel_sections() -> Sections {
    let mut states = vec![
        // 0 root
        StateDef {
            first_child: 1,
            child_count: 1,
            flags: StateFlags::COMPOSITE,
            initial_child: 1,
            ..StateDef::default()
        },
        // 1 P (parallel)
        StateDef {
            parent: 0,
            first_child: 2,
            child_count: 2,
            depth: 1,
            region_count: 2,
            region_start: 0,
            flags: StateFlags::COMPOSITE.union(StateFlags::PARALLEL),
            ..StateDef::default()
        },
    ];
    for (first_child, initial) in [(4u16, 4u16), (6, 6)] {
        states.push(StateDef {
            parent: 1,
            first_child,
            child_count: 2,
            depth: 2,
            flags: StateFlags::COMPOSITE,
            initial_child: initial,
            ..StateDef::default()
        });
    }
    for parent in [2u16, 2, 3, 3] {
        states.push(StateDef {
            parent,
            depth: 3,
            ..StateDef::default()
        });
    }

    let mut global_flags = TransitionFlags::empty();
    global_flags.insert(TransitionFlags::GLOBAL);

    Sections {
        states,
        regions: vec![
            RegionDef {
                owner: 1,
                root: 2,
                index: 0,
                state_count: 3,
            },
            RegionDef {
                owner: 1,
                root: 3,
                index: 1,
                state_count: 3,
            },
        ],
        global_transitions: vec![TransitionDef {
            source: NO_INDEX,
            target: 1,
            event: 3,
            flags: global_flags,
            cost: 1,
            ..TransitionDef::default()
        }],
        ..Sections::default()
    }
}
