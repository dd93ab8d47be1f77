//! Name side table for a compiled machine.
//!
//! The blob carries only numeric ids. The compiler emits this table next to
//! it so dumps and traces can print names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineMetadata {
    pub name: String,
    /// State names by flat index; index 0 is the synthetic root.
    pub states: Vec<String>,
    #[serde(default)]
    pub events: BTreeMap<u16, String>,
    #[serde(default)]
    pub actions: BTreeMap<u16, String>,
    #[serde(default)]
    pub guards: BTreeMap<u16, String>,
}

impl MachineMetadata {
    pub fn state_name(&self, index: u16) -> Option<&str> {
        self.states.get(index as usize).map(String::as_str)
    }

    pub fn event_name(&self, id: u16) -> Option<&str> {
        self.events.get(&id).map(String::as_str)
    }

    pub fn action_name(&self, id: u16) -> Option<&str> {
        self.actions.get(&id).map(String::as_str)
    }

    pub fn guard_name(&self, id: u16) -> Option<&str> {
        self.guards.get(&id).map(String::as_str)
    }

    /// Flat index of a state by name.
    pub fn state_index(&self, name: &str) -> Option<u16> {
        self.states
            .iter()
            .position(|s| s == name)
            .map(|i| i as u16)
    }

    pub fn event_id(&self, name: &str) -> Option<u16> {
        self.events
            .iter()
            .find_map(|(&id, n)| (n == name).then_some(id))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
