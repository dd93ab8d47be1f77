//! Sample machines shared by the compiler tests and, through the
//! `test-utils` feature, by downstream crates.

use crate::graph::{HistoryKind, ROOT, StateMachineGraph, Trigger};

/// `Idle --defeat--> A --arrive--> B --timeout--> Idle`, with entry and
/// exit actions on every state.
pub fn three_state_cycle() -> StateMachineGraph {
    let mut g = StateMachineGraph::new("Patrol");
    for action in [
        "OnEnterIdle",
        "OnExitIdle",
        "OnEnterA",
        "OnExitA",
        "OnEnterB",
        "OnExitB",
    ] {
        g.register_action(action);
    }
    for event in ["defeat", "arrive", "timeout"] {
        g.declare_event(event).unwrap();
    }

    let idle = g.add_state("Idle", ROOT).unwrap();
    let a = g.add_state("A", ROOT).unwrap();
    let b = g.add_state("B", ROOT).unwrap();
    g.state_mut(idle)
        .initial()
        .on_entry("OnEnterIdle")
        .on_exit("OnExitIdle");
    g.state_mut(a).on_entry("OnEnterA").on_exit("OnExitA");
    g.state_mut(b).on_entry("OnEnterB").on_exit("OnExitB");

    g.add_transition(idle, Some(a), Trigger::event("defeat"));
    g.add_transition(a, Some(b), Trigger::event("arrive"));
    g.add_transition(b, Some(idle), Trigger::event("timeout"));
    g
}

/// `Off`, `On { Low, High { Warm, Hot } }`; `On` keeps history of `kind`.
pub fn heater(kind: HistoryKind) -> StateMachineGraph {
    let mut g = StateMachineGraph::new("Heater");
    for event in ["power", "up", "down", "heat"] {
        g.declare_event(event).unwrap();
    }

    let off = g.add_state("Off", ROOT).unwrap();
    let on = g.add_state("On", ROOT).unwrap();
    let low = g.add_state("Low", on).unwrap();
    let high = g.add_state("High", on).unwrap();
    let warm = g.add_state("Warm", high).unwrap();
    let hot = g.add_state("Hot", high).unwrap();
    g.state_mut(on).history(kind);

    g.add_transition(off, Some(on), Trigger::event("power"));
    g.add_transition(on, Some(off), Trigger::event("power"));
    g.add_transition(low, Some(high), Trigger::event("up"));
    g.add_transition(high, Some(low), Trigger::event("down"));
    g.add_transition(warm, Some(hot), Trigger::event("heat"));
    g
}

/// `Running` runs `Left { L1, L2 }` and `Right { R1, R2 }` in parallel;
/// `panic` from anywhere goes to `Stopped`.
pub fn split_machine() -> StateMachineGraph {
    let mut g = StateMachineGraph::new("Split");
    for event in ["go", "step", "panic"] {
        g.declare_event(event).unwrap();
    }

    let stopped = g.add_state("Stopped", ROOT).unwrap();
    let running = g.add_state("Running", ROOT).unwrap();
    let left = g.add_state("Left", running).unwrap();
    let right = g.add_state("Right", running).unwrap();
    let l1 = g.add_state("L1", left).unwrap();
    let l2 = g.add_state("L2", left).unwrap();
    let r1 = g.add_state("R1", right).unwrap();
    let r2 = g.add_state("R2", right).unwrap();
    g.state_mut(running).parallel();

    g.add_transition(stopped, Some(running), Trigger::event("go"));
    g.add_transition(l1, Some(l2), Trigger::event("step"));
    g.add_transition(r1, Some(r2), Trigger::event("step"));
    g.add_global_transition(stopped, Trigger::event("panic"));
    g
}

/// `count` flat sibling states chained by `next`.
pub fn flat_chain(count: usize) -> StateMachineGraph {
    let mut g = StateMachineGraph::new("Chain");
    g.declare_event("next").unwrap();
    let ids: Vec<_> = (0..count)
        .map(|i| g.add_state(format!("S{i}"), ROOT).unwrap())
        .collect();
    for pair in ids.windows(2) {
        g.add_transition(pair[0], Some(pair[1]), Trigger::event("next"));
    }
    g
}
