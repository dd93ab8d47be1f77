//! Fixed-size runtime instances.
//!
//! An instance is an opaque 64/128/256-byte buffer. Field access goes through
//! [`InstanceView`], which pairs the buffer with its tier's [`LayoutSpec`].

mod layout;
mod queue;
mod view;

#[cfg(test)]
mod queue_tests;

pub use layout::{INSTANCE_HEADER_SIZE, LAYOUT_64, LAYOUT_128, LAYOUT_256, LayoutSpec};
pub use view::InstanceView;

use crate::codec::{read_u16, read_u32};
use crate::tier::Tier;

/// Tick phase stored in the instance header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    #[default]
    Idle = 0,
    Entry = 1,
    Rtc = 2,
    Activity = 3,
}

impl Phase {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Idle),
            1 => Some(Self::Entry),
            2 => Some(Self::Rtc),
            3 => Some(Self::Activity),
            _ => None,
        }
    }
}

/// Sticky status bits in the instance header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusFlags(u8);

impl StatusFlags {
    /// Run-to-completion hit the step cap; configuration was discarded.
    pub const RTC_OVERFLOW: Self = Self(1 << 0);
    /// More leaves were active than the tier has slots for.
    pub const LEAF_OVERFLOW: Self = Self(1 << 1);
    /// The dedicated interrupt slot holds an event.
    pub const INTERRUPT_OCCUPIED: Self = Self(1 << 2);
    /// An enqueue was refused.
    pub const QUEUE_DROPPED: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("buffer of {actual} bytes does not hold a {tier} instance")]
    SizeMismatch { tier: Tier, actual: usize },
    #[error("no instance tier is {0} bytes")]
    UnknownSize(usize),
}

/// Owned, aligned storage for one tier.
pub trait InstanceStorage {
    const TIER: Tier;

    fn bytes(&self) -> &[u8];
    fn bytes_mut(&mut self) -> &mut [u8];

    fn view(&mut self) -> InstanceView<'_> {
        match InstanceView::from_bytes(Self::TIER, self.bytes_mut()) {
            Ok(view) => view,
            Err(e) => unreachable!("storage size fixed by type: {e}"),
        }
    }

    fn machine_id(&self) -> u32 {
        read_u32(self.bytes(), layout::MACHINE_ID)
    }

    fn generation(&self) -> u16 {
        read_u16(self.bytes(), layout::GENERATION)
    }

    fn phase(&self) -> Option<Phase> {
        Phase::from_u8(self.bytes()[layout::PHASE])
    }
}

macro_rules! instance_storage {
    ($(#[$meta:meta])* $name:ident, $size:literal, $tier:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[repr(C, align(64))]
        pub struct $name {
            bytes: [u8; $size],
        }

        impl Default for $name {
            fn default() -> Self {
                Self { bytes: [0; $size] }
            }
        }

        impl $name {
            /// Zeroed and initialized for `machine_id`.
            pub fn new(machine_id: u32, seed: u32) -> Self {
                let mut instance = Self::default();
                instance.view().initialize(machine_id, seed);
                instance
            }
        }

        impl InstanceStorage for $name {
            const TIER: Tier = $tier;

            fn bytes(&self) -> &[u8] {
                &self.bytes
            }

            fn bytes_mut(&mut self) -> &mut [u8] {
                &mut self.bytes
            }
        }

        const _: () = assert!(std::mem::size_of::<$name>() == $size);
    };
}

instance_storage!(
    /// Up to 2 leaves, 2 timers, 2 history slots, one queued event.
    Instance64,
    64,
    Tier::Tier64
);
instance_storage!(
    /// Up to 4 leaves and timers, 8 history slots, interrupt slot + 1-event ring.
    Instance128,
    128,
    Tier::Tier128
);
instance_storage!(
    /// Up to 8 leaves and timers, 16 history slots, interrupt slot + 5-event ring.
    Instance256,
    256,
    Tier::Tier256
);

/// Instance of any tier, for callers that pick the tier at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TieredInstance {
    T64(Instance64),
    T128(Instance128),
    T256(Instance256),
}

impl TieredInstance {
    pub fn new(tier: Tier, machine_id: u32, seed: u32) -> Self {
        match tier {
            Tier::Tier64 => Self::T64(Instance64::new(machine_id, seed)),
            Tier::Tier128 => Self::T128(Instance128::new(machine_id, seed)),
            Tier::Tier256 => Self::T256(Instance256::new(machine_id, seed)),
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::T64(_) => Tier::Tier64,
            Self::T128(_) => Tier::Tier128,
            Self::T256(_) => Tier::Tier256,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::T64(i) => i.bytes(),
            Self::T128(i) => i.bytes(),
            Self::T256(i) => i.bytes(),
        }
    }

    pub fn view(&mut self) -> InstanceView<'_> {
        match self {
            Self::T64(i) => i.view(),
            Self::T128(i) => i.view(),
            Self::T256(i) => i.view(),
        }
    }

    pub fn machine_id(&self) -> u32 {
        read_u32(self.bytes(), layout::MACHINE_ID)
    }
}
