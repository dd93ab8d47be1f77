//! Shared map from structure hash to the current definition.

use std::collections::HashMap;
use std::sync::Arc;

use hsm_bytecode::Definition;
use parking_lot::RwLock;

/// Concurrent lookup of definitions by machine id (structure hash).
///
/// Readers (tick workers resolving an instance's machine id) take a shared
/// lock; loads and reloads take the exclusive one.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: RwLock<HashMap<u32, Arc<Definition>>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `definition` under its structure hash, replacing any previous
    /// definition with the same topology.
    pub fn insert(&self, definition: Arc<Definition>) -> Option<Arc<Definition>> {
        let id = definition.structure_hash();
        self.definitions.write().insert(id, definition)
    }

    pub fn get(&self, machine_id: u32) -> Option<Arc<Definition>> {
        self.definitions.read().get(&machine_id).cloned()
    }

    pub fn remove(&self, machine_id: u32) -> Option<Arc<Definition>> {
        self.definitions.write().remove(&machine_id)
    }

    pub fn contains(&self, machine_id: u32) -> bool {
        self.definitions.read().contains_key(&machine_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    /// Machine ids currently registered, sorted.
    pub fn machine_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.definitions.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
