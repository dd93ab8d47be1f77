use hsm_bytecode::{EventPriority, HsmEvent, NO_INDEX};
use hsm_core::{Colors, EVENT_EPSILON, EVENT_TIMER, fnv1a_16};

use super::{ActionKind, Symbolicator, TraceBuffer, TraceLevel, Tracer};
use crate::test_utils::{build, patrol};

/// One of every record kind, for a machine where state 1 is `Idle` and
/// state 2 is `A`.
fn sample(defeat: u16) -> TraceBuffer {
    let mut t = TraceBuffer::new(32, TraceLevel::ALL);
    t.set_tick(12);
    t.trace_event(0, &HsmEvent::new(defeat));
    t.trace_event(0, &HsmEvent::new(defeat).with_priority(EventPriority::Low));
    t.trace_event(1, &HsmEvent::new(EVENT_TIMER).with_priority(EventPriority::Interrupt));
    t.trace_event_dropped(1, defeat);
    t.trace_guard(0, fnv1a_16("Ready"), defeat, false);
    t.trace_transition(0, 1, 2, defeat);
    t.trace_transition(0, NO_INDEX, 1, EVENT_EPSILON);
    t.trace_exit(0, 1);
    t.trace_action(0, ActionKind::Exit, fnv1a_16("OnExitIdle"), 1);
    t.trace_enter(0, 2);
    t.trace_timer_armed(0, 0, 2, 250);
    t.trace_timer_fired(0, 0, 2);
    t.trace_action(0, ActionKind::Timer, fnv1a_16("OnEnterA"), 2);
    t.trace_activity(0, fnv1a_16("Chase"), 2);
    t.trace_conflict(0, 0b0011, 2, 1);
    t.trace_leaf_overflow(0, 2);
    t.trace_rtc_overflow(0, 100);
    t
}

#[test]
fn renders_names_from_metadata() {
    let (_, meta) = build(patrol());
    let trace = sample(meta.event_id("defeat").unwrap());

    let rendered = Symbolicator::new(Some(&meta), Colors::OFF).render(trace.records());
    insta::assert_snapshot!(rendered, @r"
    t12 #0 event defeat
    t12 #0 event defeat (low)
    t12 #1 event timer (interrupt)
    t12 #1 dropped defeat
    t12 #0 guard #3294 fail on defeat
    t12 #0 transition Idle -> A on defeat
    t12 #0 transition * -> Idle on ε
    t12 #0 exit Idle
    t12 #0 action OnExitIdle (exit Idle)
    t12 #0 enter A
    t12 #0 timer 0 armed 250ms (A)
    t12 #0 timer 0 fired (A)
    t12 #0 action OnEnterA (timer A)
    t12 #0 activity Chase (A)
    t12 #0 conflict lanes 0b00000011: A over Idle
    t12 #0 error: no leaf slot for A
    t12 #0 error: run-to-completion exceeded 100 steps
    ");
}

#[test]
fn renders_raw_ids_without_metadata() {
    let trace = sample(5);
    let symbolicator = Symbolicator::new(None, Colors::OFF);
    let lines: Vec<_> = trace.records().map(|r| symbolicator.line(&r)).collect();

    assert_eq!(lines[0], "t12 #0 event E5");
    assert_eq!(lines[5], "t12 #0 transition S1 -> S2 on E5");
    assert_eq!(lines[6], "t12 #0 transition * -> S1 on ε");
    assert_eq!(
        lines[8],
        format!("t12 #0 action #{:04x} (exit S1)", fnv1a_16("OnExitIdle"))
    );
}

#[test]
fn colors_wrap_prefix_and_names() {
    let (_, meta) = build(patrol());
    let mut trace = TraceBuffer::new(2, TraceLevel::TIER1);
    trace.trace_enter(0, 1);
    trace.trace_rtc_overflow(0, 3);

    let c = Colors::ON;
    let rendered = Symbolicator::new(Some(&meta), c).render(trace.records());
    let expected = format!(
        "{dim}t0 #0{reset} enter {blue}Idle{reset}\n\
         {dim}t0 #0{reset} {red}error: run-to-completion exceeded 3 steps{reset}\n",
        dim = c.dim,
        reset = c.reset,
        blue = c.blue,
        red = c.red,
    );
    assert_eq!(rendered, expected);
}
