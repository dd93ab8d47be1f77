//! Kernel tracing.
//!
//! The kernel is generic over [`Tracer`]. With [`NoopTracer`] every hook is
//! an empty `#[inline(always)]` function and tracing compiles away.
//! [`TraceBuffer`] records packed 16-byte records into a ring, and
//! [`Symbolicator`] turns them back into readable lines.

mod buffer;
mod symbolicate;

#[cfg(test)]
mod buffer_tests;
#[cfg(test)]
mod symbolicate_tests;

pub use buffer::{RECORD_SIZE, TraceBuffer, TraceLevel, TraceOpcode, TraceRecord};
pub use symbolicate::Symbolicator;

use hsm_bytecode::HsmEvent;

/// Why an action ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionKind {
    Entry = 0,
    Exit = 1,
    /// The transition's own action.
    Effect = 2,
    /// A state's timer expired.
    Timer = 3,
}

impl ActionKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Entry),
            1 => Some(Self::Exit),
            2 => Some(Self::Effect),
            3 => Some(Self::Timer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Effect => "effect",
            Self::Timer => "timer",
        }
    }
}

/// Kernel instrumentation hooks.
///
/// Every hook receives the instance's position in the current batch and the
/// raw ids the kernel already has. Name resolution is left to the
/// implementation.
pub trait Tracer {
    /// An event was dequeued for processing.
    fn trace_event(&mut self, instance: u32, event: &HsmEvent);

    /// A synthesized event did not fit in the queue.
    fn trace_event_dropped(&mut self, instance: u32, event: u16);

    /// A transition was selected. `source` is `NO_INDEX` for globals.
    fn trace_transition(&mut self, instance: u32, source: u16, target: u16, event: u16);

    fn trace_enter(&mut self, instance: u32, state: u16);

    fn trace_exit(&mut self, instance: u32, state: u16);

    fn trace_action(&mut self, instance: u32, kind: ActionKind, action: u16, state: u16);

    fn trace_activity(&mut self, instance: u32, action: u16, state: u16);

    fn trace_guard(&mut self, instance: u32, guard: u16, event: u16, passed: bool);

    fn trace_timer_armed(&mut self, instance: u32, slot: u16, state: u16, duration_ms: u16);

    fn trace_timer_fired(&mut self, instance: u32, slot: u16, state: u16);

    /// `loser` was denied output lanes already claimed by `winner`.
    fn trace_conflict(&mut self, instance: u32, lanes: u8, winner: u16, loser: u16);

    /// Run-to-completion exceeded its step cap; the instance was reset.
    fn trace_rtc_overflow(&mut self, instance: u32, steps: u16);

    /// No free leaf slot when `state` became active.
    fn trace_leaf_overflow(&mut self, instance: u32, state: u16);
}

/// No-op tracer. Zero cost after inlining.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_event(&mut self, _instance: u32, _event: &HsmEvent) {}

    #[inline(always)]
    fn trace_event_dropped(&mut self, _instance: u32, _event: u16) {}

    #[inline(always)]
    fn trace_transition(&mut self, _instance: u32, _source: u16, _target: u16, _event: u16) {}

    #[inline(always)]
    fn trace_enter(&mut self, _instance: u32, _state: u16) {}

    #[inline(always)]
    fn trace_exit(&mut self, _instance: u32, _state: u16) {}

    #[inline(always)]
    fn trace_action(&mut self, _instance: u32, _kind: ActionKind, _action: u16, _state: u16) {}

    #[inline(always)]
    fn trace_activity(&mut self, _instance: u32, _action: u16, _state: u16) {}

    #[inline(always)]
    fn trace_guard(&mut self, _instance: u32, _guard: u16, _event: u16, _passed: bool) {}

    #[inline(always)]
    fn trace_timer_armed(&mut self, _instance: u32, _slot: u16, _state: u16, _duration_ms: u16) {}

    #[inline(always)]
    fn trace_timer_fired(&mut self, _instance: u32, _slot: u16, _state: u16) {}

    #[inline(always)]
    fn trace_conflict(&mut self, _instance: u32, _lanes: u8, _winner: u16, _loser: u16) {}

    #[inline(always)]
    fn trace_rtc_overflow(&mut self, _instance: u32, _steps: u16) {}

    #[inline(always)]
    fn trace_leaf_overflow(&mut self, _instance: u32, _state: u16) {}
}
