//! Runtime for fasthsm machines.
//!
//! - `kernel`: the per-instance tick (`Idle -> Entry -> RTC -> Activity`)
//! - `dispatch`: action/guard callbacks keyed by 16-bit name hash
//! - `context`: per-batch execution context (user data, commands, tracer)
//! - `command`: paged command buffer and its page pool
//! - `trace`: tracer trait, ring buffer and symbolicator
//! - `rng`: xorshift32 over the instance seed
//! - `reload`/`registry`: hot reload classification and definition lookup

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod command;
pub mod context;
pub mod dispatch;
pub mod kernel;
pub mod limits;
pub mod registry;
pub mod reload;
pub mod rng;
pub mod trace;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod reload_tests;

pub use command::{Command, CommandPage, CommandWriter, PAGE_PAYLOAD_SIZE, PAGE_SIZE, PagePool};
pub use context::ExecutionContext;
pub use dispatch::{ActionFn, DispatchError, DispatchTable, GuardFn};
pub use kernel::{BatchSummary, Kernel, TickOutcome, event_for, post_event};
pub use limits::KernelLimits;
pub use registry::DefinitionRegistry;
pub use reload::{HotReloadManager, ReloadOutcome};
pub use rng::HsmRng;
pub use trace::{
    ActionKind, NoopTracer, Symbolicator, TraceBuffer, TraceLevel, TraceOpcode, TraceRecord,
    Tracer,
};
