use hsm_bytecode::EventPriority;

use super::{StateId, TransitionId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryKind {
    #[default]
    None,
    /// Restore the last active child, then its defaults.
    Shallow,
    /// Restore the exact last active descendant chain.
    Deep,
}

/// Per-state timer, armed on entry and cancelled on exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerSpec {
    pub duration_ms: u16,
    /// Action run when the timer expires, before the timer event is queued.
    pub action: Option<String>,
    /// Explicit slot; otherwise assigned by stable identity.
    pub slot: Option<u16>,
}

/// Fields computed by normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateLayout {
    pub flat_index: u16,
    pub depth: u8,
    pub initial_child: Option<StateId>,
    pub history_slot: Option<u16>,
    pub timer_slot: Option<u16>,
}

#[derive(Clone, Debug)]
pub struct StateNode {
    pub name: String,
    /// Identity that survives renames and reordering.
    pub stable_id: u32,
    pub parent: Option<StateId>,
    pub children: Vec<StateId>,
    pub transitions: Vec<TransitionId>,
    pub initial: bool,
    pub parallel: bool,
    pub history: HistoryKind,
    /// Explicit history slot; otherwise assigned by stable identity.
    pub history_slot: Option<u16>,
    pub entry: Option<String>,
    pub exit: Option<String>,
    pub activity: Option<String>,
    pub timer: Option<TimerSpec>,
    pub output_lanes: u8,
    pub layout: Option<StateLayout>,
}

impl StateNode {
    pub(crate) fn new(name: &str, stable_id: u32) -> Self {
        Self {
            name: name.to_string(),
            stable_id,
            parent: None,
            children: Vec::new(),
            transitions: Vec::new(),
            initial: false,
            parallel: false,
            history: HistoryKind::None,
            history_slot: None,
            entry: None,
            exit: None,
            activity: None,
            timer: None,
            output_lanes: 0,
            layout: None,
        }
    }

    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn stable_id(&mut self, id: u32) -> &mut Self {
        self.stable_id = id;
        self
    }

    pub fn initial(&mut self) -> &mut Self {
        self.initial = true;
        self
    }

    pub fn parallel(&mut self) -> &mut Self {
        self.parallel = true;
        self
    }

    pub fn history(&mut self, kind: HistoryKind) -> &mut Self {
        self.history = kind;
        self
    }

    pub fn history_slot(&mut self, slot: u16) -> &mut Self {
        self.history_slot = Some(slot);
        self
    }

    pub fn on_entry(&mut self, action: impl Into<String>) -> &mut Self {
        self.entry = Some(action.into());
        self
    }

    pub fn on_exit(&mut self, action: impl Into<String>) -> &mut Self {
        self.exit = Some(action.into());
        self
    }

    pub fn activity(&mut self, action: impl Into<String>) -> &mut Self {
        self.activity = Some(action.into());
        self
    }

    pub fn timer(&mut self, duration_ms: u16) -> &mut Self {
        self.timer = Some(TimerSpec {
            duration_ms,
            action: None,
            slot: None,
        });
        self
    }

    /// Requires a timer set first.
    pub fn on_timer(&mut self, action: impl Into<String>) -> &mut Self {
        if let Some(timer) = &mut self.timer {
            timer.action = Some(action.into());
        }
        self
    }

    /// Requires a timer set first.
    pub fn timer_slot(&mut self, slot: u16) -> &mut Self {
        if let Some(timer) = &mut self.timer {
            timer.slot = Some(slot);
        }
        self
    }

    pub fn output_lanes(&mut self, lanes: u8) -> &mut Self {
        self.output_lanes = lanes;
        self
    }

    pub(crate) fn layout(&self) -> StateLayout {
        match self.layout {
            Some(layout) => layout,
            None => panic!("state `{}` used before normalization", self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    Event(String),
    /// Fires on the implicit epsilon event after run-to-completion steps.
    Completion,
    /// Fires when the source state's own timer expires.
    Timer,
}

impl Trigger {
    pub fn event(name: impl Into<String>) -> Self {
        Self::Event(name.into())
    }
}

#[derive(Clone, Debug)]
pub struct TransitionNode {
    pub source: StateId,
    /// May be unset while a producer is still wiring the graph.
    pub target: Option<StateId>,
    pub trigger: Trigger,
    pub guard: Option<String>,
    pub action: Option<String>,
    pub priority: u8,
    pub internal: bool,
    pub sync_group: u16,
    pub global: bool,
}

impl TransitionNode {
    pub(crate) fn new(source: StateId, target: Option<StateId>, trigger: Trigger) -> Self {
        Self {
            source,
            target,
            trigger,
            guard: None,
            action: None,
            priority: 0,
            internal: false,
            sync_group: 0,
            global: false,
        }
    }

    pub fn guard(&mut self, guard: impl Into<String>) -> &mut Self {
        self.guard = Some(guard.into());
        self
    }

    pub fn action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = Some(action.into());
        self
    }

    pub fn priority(&mut self, priority: u8) -> &mut Self {
        self.priority = priority;
        self
    }

    pub fn internal(&mut self) -> &mut Self {
        self.internal = true;
        self
    }

    pub fn sync_group(&mut self, group: u16) -> &mut Self {
        self.sync_group = group;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventDecl {
    pub id: u16,
    /// Inline payload bytes the event carries.
    pub payload_size: u16,
    pub by_reference: bool,
    pub deferred: bool,
    pub priority: EventPriority,
}
