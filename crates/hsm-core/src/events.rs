//! Reserved event ids.
//!
//! Ids below [`FIRST_USER_EVENT`] are owned by the runtime and never handed
//! out by the graph's event table.

/// Completion ("epsilon") event, used for RTC continuations.
pub const EVENT_EPSILON: u16 = 0;

/// Synthesized when an armed state timer reaches zero.
pub const EVENT_TIMER: u16 = 1;

/// First id assigned to an authored event.
pub const FIRST_USER_EVENT: u16 = 2;
