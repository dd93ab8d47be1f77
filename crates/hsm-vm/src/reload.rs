//! Hot reload classification.
//!
//! A freshly compiled definition is compared with the one previously loaded
//! under the same logical name. Equal structure hashes mean running
//! instances stay valid; a different structure hash means they must be
//! reset and rebound. A new definition that needs a larger tier also forces
//! a reset: old instances no longer have room for its slots, and the kernel
//! skips them until they are moved into storage of the new tier.

use std::collections::HashMap;
use std::sync::Arc;

use hsm_bytecode::{Definition, InstanceStorage, InstanceView};

use crate::registry::DefinitionRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Nothing was loaded under this name before.
    NewMachine,
    /// Both hashes match.
    NoChange,
    /// Same topology, different wiring. Instances keep running.
    SoftReload,
    /// Topology changed, or the required tier grew. Instances bound to `old`
    /// must be reset. When the tier grew they also need new storage.
    HardReset { old: u32, new: u32 },
}

impl ReloadOutcome {
    pub fn classify(previous: Option<&Definition>, next: &Definition) -> Self {
        let Some(previous) = previous else {
            return Self::NewMachine;
        };
        if previous.structure_hash() != next.structure_hash() || next.tier() > previous.tier() {
            return Self::HardReset {
                old: previous.structure_hash(),
                new: next.structure_hash(),
            };
        }
        if previous.parameter_hash() != next.parameter_hash() {
            return Self::SoftReload;
        }
        Self::NoChange
    }

    pub fn requires_reset(self) -> bool {
        matches!(self, Self::HardReset { .. })
    }

    /// Reset `view` if this is a hard reset and the instance belongs to the
    /// old machine: generation bumped, everything else cleared, rebound to
    /// the new structure hash. Returns whether it was reset.
    pub fn apply(self, view: &mut InstanceView<'_>) -> bool {
        match self {
            Self::HardReset { old, new } if view.machine_id() == old => {
                view.hard_reset(new);
                true
            }
            _ => false,
        }
    }

    /// [`apply`](Self::apply) over a batch. Returns how many were reset.
    pub fn apply_all<I: InstanceStorage>(self, instances: &mut [I]) -> usize {
        let mut reset = 0;
        for instance in instances.iter_mut() {
            if self.apply(&mut instance.view()) {
                reset += 1;
            }
        }
        reset
    }
}

/// Tracks the current definition of each logical machine.
#[derive(Debug, Default)]
pub struct HotReloadManager {
    current: HashMap<String, Arc<Definition>>,
    registry: Option<Arc<DefinitionRegistry>>,
}

impl HotReloadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also publish every load into `registry`.
    pub fn with_registry(registry: Arc<DefinitionRegistry>) -> Self {
        Self {
            current: HashMap::new(),
            registry: Some(registry),
        }
    }

    pub fn current(&self, name: &str) -> Option<&Arc<Definition>> {
        self.current.get(name)
    }

    /// Load `definition` as the new version of `name`.
    ///
    /// On a hard reset the registry entry of the old topology is dropped;
    /// callers then run [`ReloadOutcome::apply`] over their instances.
    pub fn load(&mut self, name: &str, definition: Arc<Definition>) -> ReloadOutcome {
        let outcome = ReloadOutcome::classify(self.current.get(name).map(Arc::as_ref), &definition);
        if outcome == ReloadOutcome::NoChange {
            return outcome;
        }
        if let Some(registry) = &self.registry {
            if let ReloadOutcome::HardReset { old, .. } = outcome {
                registry.remove(old);
            }
            registry.insert(Arc::clone(&definition));
        }
        self.current.insert(name.to_owned(), definition);
        outcome
    }
}
