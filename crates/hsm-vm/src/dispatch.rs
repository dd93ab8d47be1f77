//! Action and guard dispatch.
//!
//! Callbacks are registered once at startup under their name; lookups at
//! tick time use the same 16-bit FNV-1a id the compiler wrote into the
//! definition. Unknown actions do nothing. Unknown guards pass.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use hsm_bytecode::InstanceView;
use hsm_core::{NO_ID, fnv1a_16};

use crate::command::CommandWriter;

/// Action callback: instance, user context, command writer.
pub type ActionFn<C> = fn(&mut InstanceView<'_>, &mut C, &mut CommandWriter<'_>);

/// Guard callback: instance, user context, current event id.
pub type GuardFn<C> = fn(&mut InstanceView<'_>, &mut C, u16) -> bool;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("`{name}` hashes to {id:#06x}, already taken by `{existing}`")]
    IdCollision {
        name: String,
        existing: String,
        id: u16,
    },
    #[error("`{0}` is already registered")]
    Duplicate(String),
}

struct Slot<F> {
    name: String,
    callback: F,
}

/// Closed name-hash to callback table, built before the first tick.
pub struct DispatchTable<C> {
    actions: HashMap<u16, Slot<ActionFn<C>>>,
    guards: HashMap<u16, Slot<GuardFn<C>>>,
}

impl<C> Default for DispatchTable<C> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
            guards: HashMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for DispatchTable<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("actions", &self.actions.len())
            .field("guards", &self.guards.len())
            .finish()
    }
}

impl<C> DispatchTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under `name`. Returns its id.
    pub fn register_action(
        &mut self,
        name: &str,
        action: ActionFn<C>,
    ) -> Result<u16, DispatchError> {
        insert(&mut self.actions, name, action)
    }

    /// Register a guard under `name`. Returns its id.
    pub fn register_guard(&mut self, name: &str, guard: GuardFn<C>) -> Result<u16, DispatchError> {
        insert(&mut self.guards, name, guard)
    }

    pub fn action(&self, id: u16) -> Option<ActionFn<C>> {
        self.actions.get(&id).map(|s| s.callback)
    }

    pub fn guard(&self, id: u16) -> Option<GuardFn<C>> {
        self.guards.get(&id).map(|s| s.callback)
    }

    pub fn action_name(&self, id: u16) -> Option<&str> {
        self.actions.get(&id).map(|s| s.name.as_str())
    }

    pub fn guard_name(&self, id: u16) -> Option<&str> {
        self.guards.get(&id).map(|s| s.name.as_str())
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Run action `id`. No-op for the absent id and unregistered ids.
    pub fn invoke_action(
        &self,
        id: u16,
        view: &mut InstanceView<'_>,
        user: &mut C,
        commands: &mut CommandWriter<'_>,
    ) {
        if id == NO_ID {
            return;
        }
        if let Some(action) = self.action(id) {
            action(view, user, commands);
        }
    }

    /// Evaluate guard `id`. The absent id and unregistered ids pass.
    pub fn check_guard(
        &self,
        id: u16,
        view: &mut InstanceView<'_>,
        user: &mut C,
        event: u16,
    ) -> bool {
        if id == NO_ID {
            return true;
        }
        match self.guard(id) {
            Some(guard) => guard(view, user, event),
            None => true,
        }
    }
}

fn insert<F>(
    table: &mut HashMap<u16, Slot<F>>,
    name: &str,
    callback: F,
) -> Result<u16, DispatchError> {
    let id = fnv1a_16(name);
    match table.entry(id) {
        Entry::Occupied(slot) if slot.get().name == name => {
            Err(DispatchError::Duplicate(name.to_owned()))
        }
        Entry::Occupied(slot) => Err(DispatchError::IdCollision {
            name: name.to_owned(),
            existing: slot.get().name.clone(),
            id,
        }),
        Entry::Vacant(slot) => {
            slot.insert(Slot {
                name: name.to_owned(),
                callback,
            });
            Ok(id)
        }
    }
}
