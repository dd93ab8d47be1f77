//! One tick of one instance.

use hsm_bytecode::{
    Definition, EventFlags, EventPriority, HsmEvent, InstanceView, MAX_DEPTH, NO_INDEX, Phase,
    StatusFlags,
};
use hsm_core::{EVENT_EPSILON, EVENT_TIMER, NO_ID};

use super::TickOutcome;
use crate::context::ExecutionContext;
use crate::dispatch::DispatchTable;
use crate::limits::KernelLimits;
use crate::trace::{ActionKind, Tracer};

pub(super) const ROOT: u16 = 0;

/// Root-to-state chain buffer length.
pub(super) const CHAIN_LEN: usize = MAX_DEPTH as usize + 1;

/// Upper bound on simultaneously active states (8 leaves, full depth).
pub(super) const MAX_ACTIVE: usize = 8 * CHAIN_LEN;

pub(super) struct Run<'r, 'v, 'a, C, T> {
    pub(super) def: &'r Definition,
    dispatch: &'r DispatchTable<C>,
    limits: KernelLimits,
    pub(super) view: &'r mut InstanceView<'v>,
    pub(super) ctx: &'r mut ExecutionContext<'a, C, T>,
}

struct RtcOverflow;

impl<'r, 'v, 'a, C, T: Tracer> Run<'r, 'v, 'a, C, T> {
    pub(super) fn new(
        def: &'r Definition,
        dispatch: &'r DispatchTable<C>,
        limits: KernelLimits,
        view: &'r mut InstanceView<'v>,
        ctx: &'r mut ExecutionContext<'a, C, T>,
    ) -> Self {
        Self {
            def,
            dispatch,
            limits,
            view,
            ctx,
        }
    }

    pub(super) fn tick(&mut self, mut phase: Phase, delta_ms: u32) -> TickOutcome {
        let mut started = false;
        let mut events: u8 = 0;
        let mut transitions: u16 = 0;
        let mut pending: Option<HsmEvent> = None;

        loop {
            self.view.set_phase(phase);
            phase = match phase {
                Phase::Idle => {
                    self.advance_timers(delta_ms);
                    if !self.view.is_initialized() || !self.view.queue_is_empty() {
                        Phase::Entry
                    } else {
                        Phase::Activity
                    }
                }
                Phase::Entry => {
                    if !self.view.is_initialized() {
                        self.descend(ROOT);
                        started = true;
                        Phase::Activity
                    } else if let Some(event) = self.next_event(&mut events) {
                        pending = Some(event);
                        Phase::Rtc
                    } else {
                        Phase::Activity
                    }
                }
                Phase::Rtc => {
                    let event = pending.take().unwrap_or(HsmEvent::new(EVENT_EPSILON));
                    match self.run_to_completion(event) {
                        Ok(steps) => {
                            transitions = transitions.saturating_add(steps);
                            let budget_left = events < self.limits.max_events_per_tick;
                            if budget_left && !self.view.queue_is_empty() {
                                Phase::Entry
                            } else {
                                Phase::Activity
                            }
                        }
                        Err(RtcOverflow) => {
                            self.contain_overflow();
                            return TickOutcome::RtcOverflow;
                        }
                    }
                }
                Phase::Activity => {
                    self.run_activities();
                    self.view.set_phase(Phase::Idle);
                    break;
                }
            };
        }

        if started {
            TickOutcome::Started
        } else {
            TickOutcome::Completed {
                events,
                transitions,
            }
        }
    }

    /// Dequeue the next non-deferred event. Deferred events go back to the
    /// queue with the flag cleared. Every dequeue counts toward the cap.
    fn next_event(&mut self, events: &mut u8) -> Option<HsmEvent> {
        while *events < self.limits.max_events_per_tick {
            let mut event = self.view.dequeue()?;
            *events += 1;
            if event.is_deferred() {
                event.flags.remove(EventFlags::DEFERRED);
                let priority = event.priority;
                if !self.view.enqueue(event, priority) {
                    self.ctx.tracer.trace_event_dropped(self.ctx.instance, event.id);
                }
                continue;
            }
            self.ctx.tracer.trace_event(self.ctx.instance, &event);
            return Some(event);
        }
        None
    }

    fn run_to_completion(&mut self, first: HsmEvent) -> Result<u16, RtcOverflow> {
        let mut event = first;
        let mut steps: u16 = 0;
        self.view.set_micro_step(0);
        while let Some(transition) = self.select(&event) {
            if steps == self.limits.max_rtc_steps {
                return Err(RtcOverflow);
            }
            self.fire(&transition, event.id);
            steps += 1;
            self.view.set_micro_step(steps.min(u8::MAX as u16) as u8);
            event = HsmEvent::new(EVENT_EPSILON);
        }
        Ok(steps)
    }

    fn contain_overflow(&mut self) {
        self.view.clear_leaves();
        self.view.clear_timers();
        self.view.insert_status(StatusFlags::RTC_OVERFLOW);
        self.view.set_phase(Phase::Idle);
        let steps = self.limits.max_rtc_steps;
        self.ctx.tracer.trace_rtc_overflow(self.ctx.instance, steps);
    }

    fn advance_timers(&mut self, delta_ms: u32) {
        if delta_ms == 0 {
            return;
        }
        for slot in 0..self.view.timer_capacity() {
            let remaining = self.view.timer(slot);
            if remaining == 0 {
                continue;
            }
            if remaining > delta_ms {
                self.view.set_timer(slot, remaining - delta_ms);
                continue;
            }
            self.view.set_timer(slot, 0);
            let slot = slot as u16;
            let Some(owner) = self.timer_owner(slot) else {
                continue;
            };
            self.ctx.tracer.trace_timer_fired(self.ctx.instance, slot, owner);
            let action = self.def.state(owner).timer_action;
            self.run_action(ActionKind::Timer, action, owner);
            if !self.view.enqueue(HsmEvent::timer(slot, owner), EventPriority::Normal) {
                self.ctx.tracer.trace_event_dropped(self.ctx.instance, EVENT_TIMER);
            }
        }
    }

    /// Active state whose timer uses `slot`.
    fn timer_owner(&self, slot: u16) -> Option<u16> {
        self.view.active_leaves().find_map(|leaf| {
            let mut state = leaf;
            while state != NO_INDEX {
                let s = self.def.state(state);
                if s.has_timer() && s.timer_slot == slot {
                    return Some(state);
                }
                state = s.parent;
            }
            None
        })
    }

    /// Activities of every active state, innermost first. A leaf whose
    /// output lanes overlap lanes already claimed this tick is skipped
    /// together with the ancestors only it would reach.
    fn run_activities(&mut self) {
        let mut claimed: u8 = 0;
        let mut owners = [NO_INDEX; 8];
        let mut ran: u8 = 0;

        for slot in 0..self.view.leaf_capacity() {
            let leaf = self.view.leaf(slot);
            if leaf == NO_INDEX {
                break;
            }
            let lanes = self.def.state(leaf).output_lanes;
            let clash = lanes & claimed;
            if clash != 0 {
                let winner = owners[clash.trailing_zeros() as usize];
                self.ctx.tracer.trace_conflict(self.ctx.instance, clash, winner, leaf);
                continue;
            }
            claimed |= lanes;
            for (bit, owner) in owners.iter_mut().enumerate() {
                if lanes & (1 << bit) != 0 {
                    *owner = leaf;
                }
            }

            let mut state = leaf;
            while state != NO_INDEX && !self.reached_earlier(state, slot, ran) {
                let s = self.def.state(state);
                if s.activity_action != NO_ID {
                    let action = s.activity_action;
                    self.ctx.tracer.trace_activity(self.ctx.instance, action, state);
                    self.invoke(action);
                }
                state = s.parent;
            }
            ran |= 1 << slot;
        }
    }

    /// True if `state` is on the chain of a leaf in an earlier slot whose
    /// bit is set in `mask`.
    pub(super) fn reached_earlier(&self, state: u16, slot: usize, mask: u8) -> bool {
        (0..slot).any(|earlier| {
            mask & (1 << earlier) != 0
                && self.def.is_ancestor_or_self(state, self.view.leaf(earlier))
        })
    }

    pub(super) fn run_action(&mut self, kind: ActionKind, action: u16, state: u16) {
        if action == NO_ID {
            return;
        }
        self.ctx.tracer.trace_action(self.ctx.instance, kind, action, state);
        self.invoke(action);
    }

    fn invoke(&mut self, action: u16) {
        self.dispatch
            .invoke_action(action, self.view, self.ctx.user, &mut self.ctx.commands);
    }

    pub(super) fn check_guard(&mut self, guard: u16, event: u16) -> bool {
        if guard == NO_ID {
            return true;
        }
        let passed = self
            .dispatch
            .check_guard(guard, self.view, self.ctx.user, event);
        self.ctx.tracer.trace_guard(self.ctx.instance, guard, event, passed);
        passed
    }
}
