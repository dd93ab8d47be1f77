//! Mutable graph model of a state machine.
//!
//! States live in an arena addressed by [`StateId`]; the synthetic root is
//! always [`ROOT`]. Names are unique and enforced at insertion. Nothing here
//! has execution semantics: normalization fills in the computed layout and
//! the validator reports problems without mutating.

mod node;


pub use node::{
    EventDecl, HistoryKind, StateLayout, StateNode, TimerSpec, TransitionNode, Trigger,
};

use hsm_bytecode::EventPriority;
use hsm_core::FIRST_USER_EVENT;
use indexmap::{IndexMap, IndexSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(u32);

impl TransitionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The synthetic root every top-level state hangs from.
pub const ROOT: StateId = StateId(0);

pub const ROOT_NAME: &str = "<root>";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("state `{0}` is already defined")]
    DuplicateState(String),
    #[error("event `{0}` is already declared")]
    DuplicateEvent(String),
    #[error("unknown state `{0}`")]
    UnknownState(String),
    #[error("too many events: ids are 16-bit")]
    EventIdsExhausted,
}

#[derive(Debug, Clone)]
pub struct StateMachineGraph {
    pub name: String,
    states: Vec<StateNode>,
    by_name: IndexMap<String, StateId>,
    transitions: Vec<TransitionNode>,
    globals: Vec<TransitionId>,
    actions: IndexSet<String>,
    guards: IndexSet<String>,
    events: IndexMap<String, EventDecl>,
    next_stable_id: u32,
    /// Flat order assigned by normalization.
    pub(crate) order: Vec<StateId>,
}

impl StateMachineGraph {
    pub fn new(name: impl Into<String>) -> Self {
        let mut root = StateNode::new(ROOT_NAME, 0);
        root.parent = None;
        Self {
            name: name.into(),
            states: vec![root],
            by_name: IndexMap::new(),
            transitions: Vec::new(),
            globals: Vec::new(),
            actions: IndexSet::new(),
            guards: IndexSet::new(),
            events: IndexMap::new(),
            next_stable_id: 1,
            order: Vec::new(),
        }
    }

    /// Add a state under `parent`. Its stable identity defaults to a
    /// creation counter; override it with [`StateNode::stable_id`] to keep
    /// history slots fixed across edits.
    pub fn add_state(
        &mut self,
        name: impl Into<String>,
        parent: StateId,
    ) -> Result<StateId, GraphError> {
        let id = self.insert_state(name.into())?;
        self.attach(id, parent);
        Ok(id)
    }

    /// Add a state with no parent. Valid graphs never keep one; this exists
    /// for producers that link parents in a later pass.
    pub fn add_detached_state(&mut self, name: impl Into<String>) -> Result<StateId, GraphError> {
        self.insert_state(name.into())
    }

    fn insert_state(&mut self, name: String) -> Result<StateId, GraphError> {
        if name == ROOT_NAME || self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateState(name));
        }
        let id = StateId(self.states.len() as u32);
        self.states.push(StateNode::new(&name, self.next_stable_id));
        self.next_stable_id += 1;
        self.by_name.insert(name, id);
        Ok(id)
    }

    fn attach(&mut self, child: StateId, parent: StateId) {
        self.states[child.index()].parent = Some(parent);
        self.states[parent.index()].children.push(child);
    }

    /// Move `state` under `parent` without any structural checks.
    pub fn reparent(&mut self, state: StateId, parent: StateId) {
        if let Some(old) = self.states[state.index()].parent {
            self.states[old.index()].children.retain(|&c| c != state);
        }
        self.attach(state, parent);
    }

    pub fn state(&self, id: StateId) -> &StateNode {
        &self.states[id.index()]
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut StateNode {
        &mut self.states[id.index()]
    }

    pub fn lookup(&self, name: &str) -> Option<StateId> {
        if name == ROOT_NAME {
            return Some(ROOT);
        }
        self.by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<StateId, GraphError> {
        self.lookup(name)
            .ok_or_else(|| GraphError::UnknownState(name.to_string()))
    }

    /// All states, root first, in creation order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &StateNode)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId(i as u32), s))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn add_transition(
        &mut self,
        source: StateId,
        target: Option<StateId>,
        trigger: Trigger,
    ) -> TransitionId {
        let id = TransitionId(self.transitions.len() as u32);
        self.transitions
            .push(TransitionNode::new(source, target, trigger));
        self.states[source.index()].transitions.push(id);
        id
    }

    /// Event handler checked before any local transition, whatever the
    /// active configuration.
    pub fn add_global_transition(&mut self, target: StateId, trigger: Trigger) -> TransitionId {
        let id = TransitionId(self.transitions.len() as u32);
        let mut node = TransitionNode::new(ROOT, Some(target), trigger);
        node.global = true;
        self.transitions.push(node);
        self.globals.push(id);
        id
    }

    pub fn transition(&self, id: TransitionId) -> &TransitionNode {
        &self.transitions[id.index()]
    }

    pub fn transition_mut(&mut self, id: TransitionId) -> &mut TransitionNode {
        &mut self.transitions[id.index()]
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &TransitionNode)> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(i, t)| (TransitionId(i as u32), t))
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn global_transitions(&self) -> &[TransitionId] {
        &self.globals
    }

    pub fn register_action(&mut self, name: impl Into<String>) {
        self.actions.insert(name.into());
    }

    pub fn register_guard(&mut self, name: impl Into<String>) {
        self.guards.insert(name.into());
    }

    pub fn actions(&self) -> &IndexSet<String> {
        &self.actions
    }

    pub fn guards(&self) -> &IndexSet<String> {
        &self.guards
    }

    /// Declare an event with default options. Ids are assigned in
    /// declaration order, starting after the reserved ones.
    pub fn declare_event(&mut self, name: impl Into<String>) -> Result<u16, GraphError> {
        self.declare_event_with(name, |_| {})
    }

    pub fn declare_event_with(
        &mut self,
        name: impl Into<String>,
        configure: impl FnOnce(&mut EventDecl),
    ) -> Result<u16, GraphError> {
        let name = name.into();
        if self.events.contains_key(&name) {
            return Err(GraphError::DuplicateEvent(name));
        }
        let id = u16::try_from(self.events.len() + FIRST_USER_EVENT as usize)
            .map_err(|_| GraphError::EventIdsExhausted)?;
        let mut decl = EventDecl {
            id,
            payload_size: 0,
            by_reference: false,
            deferred: false,
            priority: EventPriority::Normal,
        };
        configure(&mut decl);
        decl.id = id;
        self.events.insert(name, decl);
        Ok(id)
    }

    pub fn event(&self, name: &str) -> Option<&EventDecl> {
        self.events.get(name)
    }

    pub fn events(&self) -> &IndexMap<String, EventDecl> {
        &self.events
    }

    /// States in flat-index order. Empty until normalized.
    pub fn flat_order(&self) -> &[StateId] {
        &self.order
    }

    /// True if `ancestor` is `state` or on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: StateId, state: StateId) -> bool {
        let mut cur = Some(state);
        let mut steps = 0;
        while let Some(s) = cur {
            if s == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.states.len() {
                return false;
            }
            cur = self.states[s.index()].parent;
        }
        false
    }
}
