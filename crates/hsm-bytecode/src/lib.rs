//! Definition blob format and runtime instance layouts for fasthsm.
//!
//! This crate contains:
//! - The immutable definition ("ROM") format: header, state/transition/region
//!   records, section packing, loading and dumping
//! - `HsmEvent` and event priorities
//! - Tier selection and the three fixed-size instance layouts (64/128/256
//!   bytes) with their event queues
//! - `MachineMetadata`, the side table used to symbolicate ids

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod codec;
pub mod definition;
pub mod event;
pub mod instance;
pub mod metadata;
pub mod tier;


pub use definition::{
    Definition, EventDef, HEADER_SIZE, Header, MAGIC, MAX_DEPTH, MAX_STATES, MAX_TRANSITIONS,
    ModuleError, NO_INDEX, PRIORITY_MAX, RegionDef, SectionOffsets, Sections, ShapeSummary,
    StateDef, StateFlags, TransitionDef, TransitionFlags, VERSION, dump,
};
pub use event::{EVENT_SIZE, EventFlags, EventPriority, HsmEvent, PAYLOAD_SIZE};
pub use instance::{
    Instance64, Instance128, Instance256, InstanceError, InstanceStorage, InstanceView,
    LayoutSpec, Phase, StatusFlags, TieredInstance,
};
pub use metadata::MachineMetadata;
pub use tier::{Tier, select_tier};
