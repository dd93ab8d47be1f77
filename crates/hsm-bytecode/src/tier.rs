//! Instance size tiers.

use crate::instance::LayoutSpec;

/// One of the three fixed instance sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Tier64,
    Tier128,
    Tier256,
}

/// Upper bounds (states, depth, history slots, regions) for the two
/// smaller tiers. Anything larger lands in [`Tier::Tier256`].
const TIER64_LIMITS: (usize, u8, usize, usize) = (8, 3, 2, 1);
const TIER128_LIMITS: (usize, u8, usize, usize) = (32, 6, 4, 2);

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Tier64, Tier::Tier128, Tier::Tier256];

    pub const fn size(self) -> usize {
        match self {
            Tier::Tier64 => 64,
            Tier::Tier128 => 128,
            Tier::Tier256 => 256,
        }
    }

    pub fn from_size(size: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.size() == size)
    }

    pub fn layout(self) -> &'static LayoutSpec {
        LayoutSpec::for_tier(self)
    }

    /// Smallest tier with room for `leaves` concurrently active leaves.
    pub fn for_leaves(leaves: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.layout().leaf_capacity as usize >= leaves)
    }

    /// Smallest tier with room for `timers` timer slots.
    pub fn for_timers(timers: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.layout().timer_capacity as usize >= timers)
    }

    /// Smallest tier with room for `slots` history slots.
    pub fn for_history(slots: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.layout().history_capacity as usize >= slots)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}B", self.size())
    }
}

/// Pure tier choice from machine complexity. Boundary values select the
/// smaller tier.
pub fn select_tier(states: usize, depth: u8, history_slots: usize, regions: usize) -> Tier {
    let fits = |(s, d, h, r): (usize, u8, usize, usize)| {
        states <= s && depth <= d && history_slots <= h && regions <= r
    };
    if fits(TIER64_LIMITS) {
        Tier::Tier64
    } else if fits(TIER128_LIMITS) {
        Tier::Tier128
    } else {
        Tier::Tier256
    }
}
