//! Structural and semantic rule checks.
//!
//! Runs on a normalized graph and only reports; it never mutates. Any
//! Error-severity finding blocks compilation.

use std::collections::{BTreeMap, HashMap, HashSet};

use hsm_bytecode::{MAX_DEPTH, MAX_STATES, MAX_TRANSITIONS, PAYLOAD_SIZE, PRIORITY_MAX, Tier};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::{
    HistoryKind, ROOT, StateId, StateLayout, StateMachineGraph, TransitionNode, Trigger,
};

pub fn validate(graph: &StateMachineGraph) -> Diagnostics {
    let mut v = Validator {
        graph,
        diag: Diagnostics::new(),
    };
    v.check_root();
    v.check_tree();
    v.check_states();
    v.check_limits();
    v.check_transitions();
    v.check_events();
    v.check_stable_ids();
    v.check_slots();
    v.check_capacity();
    v.diag
}

struct Validator<'g> {
    graph: &'g StateMachineGraph,
    diag: Diagnostics,
}

impl<'g> Validator<'g> {
    fn reachable(&self) -> impl Iterator<Item = StateId> + use<'g> {
        self.graph.flat_order().iter().copied()
    }

    fn check_root(&mut self) {
        if self.graph.state(ROOT).children.is_empty() {
            self.diag.report(DiagnosticKind::MissingRoot).emit();
        }
    }

    fn check_tree(&mut self) {
        let graph = self.graph;
        let reachable: HashSet<StateId> = self.reachable().collect();
        for (id, state) in graph.states() {
            if id == ROOT || reachable.contains(&id) {
                continue;
            }
            match self.cycle_through(id) {
                Some(cycle) => {
                    // One report per cycle, from its lowest member.
                    if cycle.iter().min() == Some(&id) {
                        let names: Vec<_> = cycle.iter().map(|&s| name(graph, s)).collect();
                        let detail = names.join(" -> ");
                        self.diag
                            .report(DiagnosticKind::ParentCycle)
                            .message(detail)
                            .state(state.name.clone())
                            .emit();
                    }
                }
                None if !self.reaches_cycle(id) => {
                    self.diag
                        .report(DiagnosticKind::OrphanState)
                        .state(state.name.clone())
                        .emit();
                }
                None => {}
            }
        }
    }

    /// Members of the parent cycle `id` lies on, if any.
    fn cycle_through(&self, id: StateId) -> Option<Vec<StateId>> {
        let mut chain = vec![id];
        let mut cur = self.graph.state(id).parent;
        while let Some(p) = cur {
            if p == id {
                return Some(chain);
            }
            if chain.contains(&p) || chain.len() > self.graph.state_count() {
                return None;
            }
            chain.push(p);
            cur = self.graph.state(p).parent;
        }
        None
    }

    /// True if the parent chain of `id` runs into a cycle `id` is not on.
    fn reaches_cycle(&self, id: StateId) -> bool {
        let mut seen = HashSet::from([id]);
        let mut cur = self.graph.state(id).parent;
        while let Some(p) = cur {
            if !seen.insert(p) {
                return true;
            }
            cur = self.graph.state(p).parent;
        }
        false
    }

    fn check_states(&mut self) {
        let graph = self.graph;
        for id in self.reachable() {
            let state = graph.state(id);

            if !state.parallel {
                let initials = state
                    .children
                    .iter()
                    .filter(|&&c| graph.state(c).initial)
                    .count();
                if initials > 1 {
                    self.diag
                        .report(DiagnosticKind::MultipleInitialStates)
                        .message(format!("{initials} children marked initial"))
                        .state(state.name.clone())
                        .emit();
                }
            }

            if state.history != HistoryKind::None {
                if state.children.is_empty() {
                    self.diag
                        .report(DiagnosticKind::HistoryNotComposite)
                        .state(state.name.clone())
                        .emit();
                } else if state.parallel {
                    self.diag
                        .report(DiagnosticKind::HistoryOnParallel)
                        .state(state.name.clone())
                        .emit();
                }
            }

            let timer_action = state.timer.as_ref().and_then(|t| t.action.as_ref());
            for action in [&state.entry, &state.exit, &state.activity]
                .into_iter()
                .flatten()
                .chain(timer_action)
            {
                self.check_action(action, &state.name);
            }

            if let Some(timer) = &state.timer
                && timer.duration_ms == 0
            {
                self.diag
                    .report(DiagnosticKind::ZeroTimerDuration)
                    .state(state.name.clone())
                    .emit();
            }
        }
    }

    fn check_action(&mut self, action: &str, state: &str) {
        if !self.graph.actions().contains(action) {
            self.diag
                .report(DiagnosticKind::UnregisteredAction)
                .message(action)
                .state(state)
                .emit();
        }
    }

    fn check_limits(&mut self) {
        let states = self.graph.flat_order().len();
        if states > MAX_STATES {
            self.diag
                .report(DiagnosticKind::TooManyStates)
                .message(format!("{states} (max {MAX_STATES})"))
                .emit();
        }

        let transitions = self.graph.transition_count();
        if transitions > MAX_TRANSITIONS {
            self.diag
                .report(DiagnosticKind::TooManyTransitions)
                .message(format!("{transitions} (max {MAX_TRANSITIONS})"))
                .emit();
        }

        let graph = self.graph;
        let deepest = self
            .reachable()
            .filter_map(|id| Some((graph.state(id).layout?.depth, id)))
            .max();
        if let Some((depth, id)) = deepest
            && depth > MAX_DEPTH
        {
            self.diag
                .report(DiagnosticKind::DepthExceeded)
                .message(format!("{depth} levels (max {MAX_DEPTH})"))
                .state(name(graph, id))
                .emit();
        }
    }

    fn check_transitions(&mut self) {
        let graph = self.graph;
        let reachable: HashSet<StateId> = self.reachable().collect();
        for (_, t) in graph.transitions() {
            if !t.global && !reachable.contains(&t.source) {
                continue;
            }
            let source = if t.global {
                format!("* on {}", trigger_label(t))
            } else {
                name(graph, t.source).to_string()
            };
            self.check_transition(t, &source, &reachable);
        }
    }

    fn check_transition(
        &mut self,
        t: &TransitionNode,
        source: &str,
        reachable: &HashSet<StateId>,
    ) {
        let graph = self.graph;
        match &t.trigger {
            Trigger::Event(name) if self.graph.event(name).is_none() => {
                self.diag
                    .report(DiagnosticKind::UnregisteredEvent)
                    .message(name)
                    .state(source)
                    .emit();
            }
            Trigger::Timer if !t.global && self.graph.state(t.source).timer.is_none() => {
                self.diag
                    .report(DiagnosticKind::TimerTriggerWithoutTimer)
                    .state(source)
                    .emit();
            }
            _ => {}
        }

        if let Some(guard) = &t.guard
            && !self.graph.guards().contains(guard)
        {
            self.diag
                .report(DiagnosticKind::UnregisteredGuard)
                .message(guard)
                .state(source)
                .emit();
        }
        if let Some(action) = &t.action {
            self.check_action(action, source);
        }

        if t.priority > PRIORITY_MAX {
            self.diag
                .report(DiagnosticKind::PriorityOutOfRange)
                .message(format!("{} (max {PRIORITY_MAX})", t.priority))
                .state(source)
                .emit();
        }

        match t.target {
            None if t.internal => {}
            None => {
                self.diag
                    .report(DiagnosticKind::MissingTransitionTarget)
                    .state(source)
                    .emit();
            }
            Some(ROOT) => {
                self.diag
                    .report(DiagnosticKind::TransitionToRoot)
                    .state(source)
                    .emit();
            }
            Some(target) if !reachable.contains(&target) => {
                self.diag
                    .report(DiagnosticKind::MissingTransitionTarget)
                    .message(format!("`{}` is not in the tree", name(graph, target)))
                    .state(source)
                    .emit();
            }
            Some(_) => {}
        }
    }

    fn check_events(&mut self) {
        for (name, decl) in self.graph.events() {
            if decl.payload_size as usize > PAYLOAD_SIZE && !decl.by_reference {
                self.diag
                    .report(DiagnosticKind::OversizedInlinePayload)
                    .message(name)
                    .emit();
            }
            if decl.by_reference && decl.deferred {
                self.diag
                    .report(DiagnosticKind::ByReferenceDeferred)
                    .message(format!("event `{name}`"))
                    .emit();
            }
        }
    }

    fn check_stable_ids(&mut self) {
        let graph = self.graph;
        let mut owners: BTreeMap<u32, Vec<StateId>> = BTreeMap::new();
        for id in self.reachable().filter(|&id| id != ROOT) {
            owners
                .entry(self.graph.state(id).stable_id)
                .or_default()
                .push(id);
        }
        for (stable, ids) in owners {
            if ids.len() > 1 {
                let names: Vec<_> = ids.iter().map(|&s| format!("`{}`", name(graph, s))).collect();
                self.diag
                    .report(DiagnosticKind::DuplicateStableId)
                    .message(format!("{stable} shared by {}", names.join(", ")))
                    .emit();
            }
        }
    }

    fn check_slots(&mut self) {
        let graph = self.graph;
        let mut history: BTreeMap<u16, Vec<StateId>> = BTreeMap::new();
        let mut timers: BTreeMap<u16, Vec<StateId>> = BTreeMap::new();
        for id in self.reachable() {
            let Some(layout) = self.graph.state(id).layout else {
                continue;
            };
            if let Some(slot) = layout.history_slot {
                history.entry(slot).or_default().push(id);
            }
            if let Some(slot) = layout.timer_slot {
                timers.entry(slot).or_default().push(id);
            }
        }

        for (what, slots) in [("history", history), ("timer", timers)] {
            for (slot, owners) in slots {
                for (i, &a) in owners.iter().enumerate() {
                    for &b in &owners[i + 1..] {
                        if co_active(graph, a, b) {
                            let detail = format!(
                                "{what} slot {slot} by `{}` and `{}`",
                                name(graph, a),
                                name(graph, b)
                            );
                            self.diag
                                .report(DiagnosticKind::RegionSlotConflict)
                                .message(detail)
                                .state(name(graph, b))
                                .emit();
                        }
                    }
                }
            }
        }
    }

    fn check_capacity(&mut self) {
        let graph = self.graph;
        let limits = Tier::Tier256.layout();

        let leaves = max_leaves(self.graph);
        if leaves > limits.leaf_capacity as usize {
            self.diag
                .report(DiagnosticKind::LeafCapacityExceeded)
                .message(format!("{leaves} (max {})", limits.leaf_capacity))
                .emit();
        }

        let slot_count = |f: fn(&StateLayout) -> Option<u16>| {
            graph
                .flat_order()
                .iter()
                .filter_map(|&id| graph.state(id).layout.as_ref().and_then(f))
                .map(|s| s as usize + 1)
                .max()
                .unwrap_or(0)
        };
        let timers = slot_count(|l| l.timer_slot);
        let history = slot_count(|l| l.history_slot);

        if timers > limits.timer_capacity as usize {
            self.diag
                .report(DiagnosticKind::TimerCapacityExceeded)
                .message(format!("{timers} (max {})", limits.timer_capacity))
                .emit();
        }
        if history > limits.history_capacity as usize {
            self.diag
                .report(DiagnosticKind::HistoryCapacityExceeded)
                .message(format!("{history} (max {})", limits.history_capacity))
                .emit();
        }
    }
}

/// Worst-case simultaneously active leaves: parallel states sum their
/// children, other composites take the maximum.
pub(crate) fn max_leaves(graph: &StateMachineGraph) -> usize {
    let mut leaves: HashMap<StateId, usize> = HashMap::new();
    for &id in graph.flat_order().iter().rev() {
        let state = graph.state(id);
        let children = state.children.iter().filter_map(|c| leaves.get(c).copied());
        let count = if state.children.is_empty() {
            1
        } else if state.parallel {
            children.sum()
        } else {
            children.max().unwrap_or(1)
        };
        leaves.insert(id, count);
    }
    leaves.get(&ROOT).copied().unwrap_or(0)
}

/// Whether two states can be active at the same time.
fn co_active(graph: &StateMachineGraph, a: StateId, b: StateId) -> bool {
    if graph.is_ancestor_or_self(a, b) || graph.is_ancestor_or_self(b, a) {
        return true;
    }
    let mut lca = graph.state(a).parent;
    while let Some(candidate) = lca {
        if graph.is_ancestor_or_self(candidate, b) {
            return graph.state(candidate).parallel;
        }
        lca = graph.state(candidate).parent;
    }
    false
}

fn name(graph: &StateMachineGraph, id: StateId) -> &str {
    &graph.state(id).name
}

fn trigger_label(t: &TransitionNode) -> String {
    match &t.trigger {
        Trigger::Event(name) => name.clone(),
        Trigger::Completion => "completion".to_string(),
        Trigger::Timer => "timer".to_string(),
    }
}
