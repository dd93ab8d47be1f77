#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared primitives for the fasthsm toolchain.
//!
//! - `hash`: FNV-1a name hashing used for action/guard ids on both sides of
//!   the compiler/runtime boundary
//! - `events`: reserved event ids
//! - `colors`: ANSI palette for dumps, diagnostics and trace output

pub mod colors;
pub mod events;
pub mod hash;


pub use colors::Colors;
pub use events::{EVENT_EPSILON, EVENT_TIMER, FIRST_USER_EVENT};
pub use hash::{NO_ID, fnv1a_16, fnv1a_32};
