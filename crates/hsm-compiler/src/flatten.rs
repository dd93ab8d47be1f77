//! Graph to flat record arrays.
//!
//! States are emitted in flat-index order. Each state's transitions form one
//! contiguous run, highest priority first (declaration order breaks ties).
//! Action and guard names become 16-bit ids via FNV-1a, deduplicated into
//! one table each.

use std::collections::{BTreeMap, HashMap};

use hsm_bytecode::{
    EventDef, EventFlags, NO_INDEX, RegionDef, Sections, StateDef, StateFlags, TransitionDef,
    TransitionFlags,
};
use hsm_core::{EVENT_EPSILON, EVENT_TIMER, NO_ID, fnv1a_16};
use indexmap::IndexMap;

use crate::graph::{
    HistoryKind, ROOT, StateId, StateMachineGraph, TransitionId, TransitionNode, Trigger,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    #[error("`{first}` and `{second}` both hash to id {id:#06x}")]
    IdCollision {
        first: String,
        second: String,
        id: u16,
    },
}

#[derive(Debug, Clone)]
pub struct Flattened {
    pub sections: Sections,
    pub action_names: BTreeMap<u16, String>,
    pub guard_names: BTreeMap<u16, String>,
}

/// Name -> id table with collision detection.
#[derive(Debug, Default)]
struct IdTable {
    by_name: IndexMap<String, u16>,
    by_id: BTreeMap<u16, String>,
}

impl IdTable {
    fn intern(&mut self, name: Option<&String>) -> Result<u16, FlattenError> {
        let Some(name) = name else {
            return Ok(NO_ID);
        };
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        let id = fnv1a_16(name);
        if let Some(first) = self.by_id.get(&id) {
            return Err(FlattenError::IdCollision {
                first: first.clone(),
                second: name.clone(),
                id,
            });
        }
        self.by_name.insert(name.clone(), id);
        self.by_id.insert(id, name.clone());
        Ok(id)
    }

    fn ids(&self) -> Vec<u16> {
        self.by_name.values().copied().collect()
    }
}

pub fn flatten(graph: &StateMachineGraph) -> Result<Flattened, FlattenError> {
    let mut flattener = Flattener {
        graph,
        actions: IdTable::default(),
        guards: IdTable::default(),
        sections: Sections::default(),
    };
    let region_starts = flattener.build_regions();
    flattener.build_states(&region_starts)?;
    flattener.build_globals()?;
    flattener.build_events();

    let Flattener {
        mut sections,
        actions,
        guards,
        ..
    } = flattener;
    sections.actions = actions.ids();
    sections.guards = guards.ids();

    Ok(Flattened {
        sections,
        action_names: actions.by_id,
        guard_names: guards.by_id,
    })
}

struct Flattener<'g> {
    graph: &'g StateMachineGraph,
    actions: IdTable,
    guards: IdTable,
    sections: Sections,
}

impl<'g> Flattener<'g> {
    fn index(&self, id: StateId) -> u16 {
        self.graph.state(id).layout().flat_index
    }

    fn depth(&self, id: StateId) -> u8 {
        self.graph.state(id).layout().depth
    }

    /// One region per child of each parallel state, in flat order.
    fn build_regions(&mut self) -> HashMap<StateId, u16> {
        let graph = self.graph;
        let mut starts = HashMap::new();
        for &id in graph.flat_order() {
            let state = graph.state(id);
            if !state.parallel || state.children.is_empty() {
                continue;
            }
            starts.insert(id, self.sections.regions.len() as u16);
            for (i, &child) in state.children.iter().enumerate() {
                let region = RegionDef {
                    owner: self.index(id),
                    root: self.index(child),
                    index: i as u16,
                    state_count: subtree_size(graph, child) as u16,
                };
                self.sections.regions.push(region);
            }
        }
        starts
    }

    fn build_states(
        &mut self,
        region_starts: &HashMap<StateId, u16>,
    ) -> Result<(), FlattenError> {
        let graph = self.graph;
        for &id in graph.flat_order() {
            let node = graph.state(id);
            let layout = node.layout();

            let mut flags = StateFlags::empty();
            if node.is_composite() {
                flags.insert(StateFlags::COMPOSITE);
            }
            if node.parallel {
                flags.insert(StateFlags::PARALLEL);
            }
            match node.history {
                HistoryKind::None => {}
                HistoryKind::Shallow => flags.insert(StateFlags::HISTORY),
                HistoryKind::Deep => {
                    flags.insert(StateFlags::HISTORY);
                    flags.insert(StateFlags::DEEP_HISTORY);
                }
            }
            let is_default = node
                .parent
                .and_then(|p| graph.state(p).layout)
                .is_some_and(|p| p.initial_child == Some(id));
            if node.initial || is_default {
                flags.insert(StateFlags::INITIAL);
            }

            let mut def = StateDef {
                parent: node.parent.map_or(NO_INDEX, |p| self.index(p)),
                depth: layout.depth,
                flags,
                output_lanes: node.output_lanes,
                entry_action: self.actions.intern(node.entry.as_ref())?,
                exit_action: self.actions.intern(node.exit.as_ref())?,
                activity_action: self.actions.intern(node.activity.as_ref())?,
                history_slot: layout.history_slot.unwrap_or(NO_INDEX),
                initial_child: layout.initial_child.map_or(NO_INDEX, |c| self.index(c)),
                ..StateDef::default()
            };
            if let Some(&first) = node.children.first() {
                def.first_child = self.index(first);
                def.child_count = node.children.len() as u16;
            }

            if let Some(timer) = &node.timer {
                def.flags.insert(StateFlags::HAS_TIMER);
                def.timer_slot = layout.timer_slot.unwrap_or(NO_INDEX);
                def.timer_ms = timer.duration_ms;
                def.timer_action = self.actions.intern(timer.action.as_ref())?;
            }

            if let Some(&start) = region_starts.get(&id) {
                def.region_start = start;
                def.region_count = node.children.len() as u8;
            }

            let mut local: Vec<TransitionId> = node.transitions.clone();
            // Stable: equal priorities keep declaration order.
            local.sort_by_key(|&t| std::cmp::Reverse(graph.transition(t).priority));
            if !local.is_empty() {
                def.transition_start = self.sections.transitions.len() as u16;
                def.transition_count = local.len() as u16;
            }
            for t in local {
                let record = self.transition(graph.transition(t))?;
                self.sections.transitions.push(record);
            }

            self.sections.states.push(def);
        }
        Ok(())
    }

    fn build_globals(&mut self) -> Result<(), FlattenError> {
        let graph = self.graph;
        let mut globals: Vec<TransitionId> = graph.global_transitions().to_vec();
        globals.sort_by_key(|&t| std::cmp::Reverse(graph.transition(t).priority));
        for t in globals {
            let record = self.transition(graph.transition(t))?;
            self.sections.global_transitions.push(record);
        }
        Ok(())
    }

    fn build_events(&mut self) {
        for decl in self.graph.events().values() {
            let mut flags = EventFlags::empty();
            if decl.deferred {
                flags.insert(EventFlags::DEFERRED);
            }
            if decl.by_reference {
                flags.insert(EventFlags::BY_REFERENCE);
            }
            self.sections.events.push(EventDef {
                id: decl.id,
                flags,
                priority: decl.priority,
            });
        }
    }

    fn transition(&mut self, t: &TransitionNode) -> Result<TransitionDef, FlattenError> {
        let event = match &t.trigger {
            Trigger::Event(name) => self.graph.event(name).map_or(NO_ID, |e| e.id),
            Trigger::Completion => EVENT_EPSILON,
            Trigger::Timer => EVENT_TIMER,
        };
        let target = t.target.unwrap_or(t.source);

        let mut flags = TransitionFlags::empty();
        if t.internal {
            flags.insert(TransitionFlags::INTERNAL);
        }
        if t.global {
            flags.insert(TransitionFlags::GLOBAL);
        }

        Ok(TransitionDef {
            source: if t.global { NO_INDEX } else { self.index(t.source) },
            target: self.index(target),
            event,
            sync_group: t.sync_group,
            guard: self.guards.intern(t.guard.as_ref())?,
            action: self.actions.intern(t.action.as_ref())?,
            flags,
            priority: t.priority,
            cost: self.cost(t, target),
        })
    }

    /// Exit steps from the source up to the LCA plus entry steps down to
    /// the target. Global transitions have no fixed source: entry steps only.
    fn cost(&self, t: &TransitionNode, target: StateId) -> u16 {
        if t.internal {
            return 0;
        }
        if t.global {
            return self.depth(target) as u16;
        }
        let lca = transition_lca(self.graph, t.source, target);
        let exits = self.depth(t.source) - self.depth(lca);
        let entries = self.depth(target) - self.depth(lca);
        exits as u16 + entries as u16
    }
}

/// LCA for an external transition. When one end contains the other (self
/// transitions included) the LCA moves up one level so that end is exited
/// and re-entered. A parallel LCA is lifted too, so a transition never
/// leaves its sibling regions half active.
pub(crate) fn transition_lca(
    graph: &StateMachineGraph,
    source: StateId,
    target: StateId,
) -> StateId {
    let chain = |mut s: StateId| {
        let mut out = vec![s];
        while let Some(p) = graph.state(s).parent {
            out.push(p);
            s = p;
        }
        out.reverse();
        out
    };
    let a = chain(source);
    let b = chain(target);
    let mut lca = ROOT;
    for (x, y) in a.iter().zip(&b) {
        if x != y {
            break;
        }
        lca = *x;
    }
    if lca == source || lca == target {
        lca = graph.state(lca).parent.unwrap_or(ROOT);
    }
    while lca != ROOT && graph.state(lca).parallel {
        lca = graph.state(lca).parent.unwrap_or(ROOT);
    }
    lca
}

fn subtree_size(graph: &StateMachineGraph, root: StateId) -> usize {
    1 + graph
        .state(root)
        .children
        .iter()
        .map(|&c| subtree_size(graph, c))
        .sum::<usize>()
}
