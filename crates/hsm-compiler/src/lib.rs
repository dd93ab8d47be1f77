//! fasthsm compiler: graph model to immutable definition blob.
//!
//! Pipeline stages, leaf to root:
//! - `graph` - mutable state machine model with typed ids
//! - `normalize` - breadth-first flat indices, depths, default children,
//!   history and timer slots
//! - `validate` - rule checks producing `Diagnostics`
//! - `flatten` - flat record arrays and deduplicated action/guard id tables
//! - `emit` - structure/parameter hashes and blob packing
//! - `compile` - the facade running all of the above

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compile;
pub mod diagnostics;
pub mod emit;
pub mod flatten;
pub mod graph;
pub mod normalize;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use compile::{CompiledMachine, compile};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use flatten::FlattenError;
pub use graph::{
    EventDecl, GraphError, HistoryKind, ROOT, StateId, StateMachineGraph, TransitionId, Trigger,
};

/// Errors that stop compilation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation failed with {} errors", .0.error_count())]
    ValidationFailed(Diagnostics),

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error("emitted definition failed to load: {0}")]
    Load(#[from] hsm_bytecode::ModuleError),
}

pub type Result<T> = std::result::Result<T, Error>;
