//! Tick kernel.
//!
//! Each tick walks one instance through `Idle -> Entry -> RTC -> Activity`
//! and back to `Idle`, entirely within the call:
//!
//! - Idle: count timers down, queue timer events for expired ones
//! - Entry: enter the default configuration on the first tick, otherwise
//!   dequeue the next event (re-queueing deferred ones)
//! - RTC: fire the best transition for the event, then keep firing
//!   completion (epsilon) transitions until none applies
//! - Activity: run activity actions of the active configuration, with
//!   output-lane arbitration between orthogonal regions
//!
//! Instances bound to another machine, smaller than the tier the definition
//! needs, or with a corrupt phase byte, are skipped. A run-to-completion
//! that exceeds its step cap resets the active configuration instead of
//! spinning.

mod post;
mod run;
mod select;
mod transition;

#[cfg(test)]
mod timer_tests;

pub use post::{event_for, post_event};

use hsm_bytecode::{Definition, InstanceStorage, InstanceView};

use crate::context::ExecutionContext;
use crate::dispatch::DispatchTable;
use crate::limits::KernelLimits;
use crate::trace::Tracer;

use run::Run;

/// Result of ticking one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Bound to another machine, too small for the definition's tier, or the
    /// phase byte is invalid. Untouched.
    Skipped,
    /// First tick: the default configuration was entered. No events ran.
    Started,
    Completed { events: u8, transitions: u16 },
    /// Run-to-completion hit the step cap. Active leaves were cleared.
    RtcOverflow,
}

/// Tallies for [`Kernel::tick_batch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub ticked: usize,
    pub skipped: usize,
    pub started: usize,
    pub overflowed: usize,
    pub events: usize,
    pub transitions: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Skipped => {
                self.skipped += 1;
                return;
            }
            TickOutcome::Started => self.started += 1,
            TickOutcome::Completed {
                events,
                transitions,
            } => {
                self.events += events as usize;
                self.transitions += transitions as usize;
            }
            TickOutcome::RtcOverflow => self.overflowed += 1,
        }
        self.ticked += 1;
    }
}

/// Runs instances of one definition.
pub struct Kernel<'d, C> {
    definition: &'d Definition,
    dispatch: &'d DispatchTable<C>,
    limits: KernelLimits,
}

impl<'d, C> Kernel<'d, C> {
    pub fn new(definition: &'d Definition, dispatch: &'d DispatchTable<C>) -> Self {
        Self {
            definition,
            dispatch,
            limits: KernelLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: KernelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn definition(&self) -> &'d Definition {
        self.definition
    }

    pub fn limits(&self) -> KernelLimits {
        self.limits
    }

    /// Advance one instance by `delta_ms`.
    pub fn tick<T: Tracer>(
        &self,
        view: &mut InstanceView<'_>,
        ctx: &mut ExecutionContext<'_, C, T>,
        delta_ms: u32,
    ) -> TickOutcome {
        if view.machine_id() != self.definition.structure_hash()
            || view.tier() < self.definition.tier()
        {
            return TickOutcome::Skipped;
        }
        let Some(phase) = view.phase() else {
            return TickOutcome::Skipped;
        };
        Run::new(self.definition, self.dispatch, self.limits, view, ctx).tick(phase, delta_ms)
    }

    /// Tick every instance in order. `ctx.instance` is set to each
    /// instance's index before it runs.
    pub fn tick_batch<I: InstanceStorage, T: Tracer>(
        &self,
        instances: &mut [I],
        ctx: &mut ExecutionContext<'_, C, T>,
        delta_ms: u32,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for (index, instance) in instances.iter_mut().enumerate() {
            ctx.instance = index as u32;
            let mut view = instance.view();
            summary.record(self.tick(&mut view, ctx, delta_ms));
        }
        summary
    }
}
