//! Immutable definition blob ("ROM") for a compiled state machine.
//!
//! Layout: a 32-byte [`Header`] followed by tightly packed sections in this
//! order: States -> Transitions -> Regions -> GlobalTransitions -> Events ->
//! ActionIds -> GuardIds. All integers are little-endian.

mod dump;
mod header;
mod module;
mod records;
mod sections;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod module_tests;
#[cfg(test)]
mod records_tests;
#[cfg(test)]
pub(crate) mod test_utils;

pub use dump::dump;
pub use header::{Header, SectionOffsets};
pub use module::{Definition, ModuleError, ShapeSummary};
pub use records::{EventDef, RegionDef, StateDef, StateFlags, TransitionDef, TransitionFlags};
pub use sections::Sections;

/// Magic bytes: b"FHSM".
pub const MAGIC: [u8; 4] = *b"FHSM";

/// Format version.
pub const VERSION: u16 = 1;

pub const HEADER_SIZE: usize = 32;
pub const STATE_DEF_SIZE: usize = 32;
pub const TRANSITION_DEF_SIZE: usize = 16;
pub const REGION_DEF_SIZE: usize = 8;
pub const EVENT_DEF_SIZE: usize = 4;
pub const ID_ENTRY_SIZE: usize = 2;

/// Sentinel for an absent state/transition/slot index.
pub const NO_INDEX: u16 = 0xFFFF;

pub const MAX_STATES: usize = 65535;
pub const MAX_TRANSITIONS: usize = 65535;
pub const MAX_DEPTH: u8 = 15;
pub const PRIORITY_MAX: u8 = 15;
