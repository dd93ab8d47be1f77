use hsm_bytecode::{Instance64, InstanceStorage};
use hsm_compiler::{ROOT, StateMachineGraph, Trigger};
use hsm_core::Colors;

use super::{Kernel, TickOutcome, post_event};
use crate::command::{CommandPage, CommandWriter};
use crate::context::ExecutionContext;
use crate::test_utils::{Recorder, build, dispatch, leaves};
use crate::trace::{Symbolicator, TraceBuffer, TraceLevel};

const BLINK_SLOT: usize = 0;

/// `On` (100 ms timer running `Tick`) falls back to `Off` when the timer
/// expires; `toggle` flips between the two.
fn blink() -> StateMachineGraph {
    let mut g = StateMachineGraph::new("Blink");
    g.register_action("Tick");
    g.declare_event("toggle").unwrap();
    let off = g.add_state("Off", ROOT).unwrap();
    let on = g.add_state("On", ROOT).unwrap();
    g.state_mut(on).initial().timer(100).on_timer("Tick");

    g.add_transition(on, Some(off), Trigger::Timer);
    g.add_transition(on, Some(off), Trigger::event("toggle"));
    g.add_transition(off, Some(on), Trigger::event("toggle"));
    g
}

#[test]
fn timer_counts_down_then_fires_transition() {
    let (def, meta) = build(blink());
    let table = dispatch();
    let kernel = Kernel::new(&def, &table);
    let mut inst = Instance64::new(def.structure_hash(), 1);
    let mut view = inst.view();
    let mut user = Recorder::default();
    let mut page = CommandPage::new();
    let trace = TraceBuffer::new(32, TraceLevel::TIER1.union(TraceLevel::TIER2));
    let mut ctx = ExecutionContext::with_tracer(&mut user, CommandWriter::new(&mut page), trace);

    kernel.tick(&mut view, &mut ctx, 0);
    assert_eq!(view.timer(BLINK_SLOT), 100);

    let quiet = kernel.tick(&mut view, &mut ctx, 40);
    assert_eq!(
        quiet,
        TickOutcome::Completed {
            events: 0,
            transitions: 0
        }
    );
    assert_eq!(view.timer(BLINK_SLOT), 60);

    ctx.tracer.clear();
    let fired = kernel.tick(&mut view, &mut ctx, 60);
    assert_eq!(
        fired,
        TickOutcome::Completed {
            events: 1,
            transitions: 1
        }
    );
    assert_eq!(leaves(&view, &meta), ["Off"]);
    assert_eq!(view.timer(BLINK_SLOT), 0);
    assert_eq!(ctx.user.log, ["Tick"]);

    let rendered = Symbolicator::new(Some(&meta), Colors::OFF).render(ctx.tracer.records());
    insta::assert_snapshot!(rendered, @r"
    t0 #0 timer 0 fired (On)
    t0 #0 action Tick (timer On)
    t0 #0 event timer
    t0 #0 transition On -> Off on timer
    t0 #0 exit On
    t0 #0 enter Off
    ");
}

#[test]
fn large_delta_fires_once() {
    let (def, meta) = build(blink());
    let table = dispatch();
    let kernel = Kernel::new(&def, &table);
    let mut inst = Instance64::new(def.structure_hash(), 1);
    let mut view = inst.view();
    let mut user = Recorder::default();
    let mut page = CommandPage::new();
    let mut ctx = ExecutionContext::new(&mut user, CommandWriter::new(&mut page));

    kernel.tick(&mut view, &mut ctx, 0);
    kernel.tick(&mut view, &mut ctx, 10_000);
    assert_eq!(leaves(&view, &meta), ["Off"]);
    assert_eq!(ctx.user.log, ["Tick"]);
}

#[test]
fn exit_cancels_timer_and_reentry_rearms() {
    let (def, meta) = build(blink());
    let table = dispatch();
    let kernel = Kernel::new(&def, &table);
    let mut inst = Instance64::new(def.structure_hash(), 1);
    let mut view = inst.view();
    let mut user = Recorder::default();
    let mut page = CommandPage::new();
    let trace = TraceBuffer::new(32, TraceLevel::TIER2);
    let mut ctx = ExecutionContext::with_tracer(&mut user, CommandWriter::new(&mut page), trace);
    let toggle = meta.event_id("toggle").unwrap();

    kernel.tick(&mut view, &mut ctx, 0);
    kernel.tick(&mut view, &mut ctx, 30);
    post_event(&def, &mut view, toggle);
    kernel.tick(&mut view, &mut ctx, 0);
    assert_eq!(leaves(&view, &meta), ["Off"]);
    assert_eq!(view.timer(BLINK_SLOT), 0);

    // A cancelled timer never fires, however long we wait.
    kernel.tick(&mut view, &mut ctx, 500);
    assert_eq!(leaves(&view, &meta), ["Off"]);
    assert!(ctx.user.log.is_empty());

    post_event(&def, &mut view, toggle);
    kernel.tick(&mut view, &mut ctx, 0);
    assert_eq!(view.timer(BLINK_SLOT), 100);

    let rendered = Symbolicator::new(Some(&meta), Colors::OFF).render(ctx.tracer.records());
    insta::assert_snapshot!(rendered, @r"
    t0 #0 timer 0 armed 100ms (On)
    t0 #0 timer 0 armed 100ms (On)
    ");
}
