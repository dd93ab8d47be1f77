//! Flat index assignment and derived per-state layout.
//!
//! Breadth-first from the root (index 0), so every parent index is smaller
//! than its children's. History and timer slots are handed out in stable-id
//! order, skipping slots claimed explicitly.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::{HistoryKind, ROOT, StateId, StateLayout, StateMachineGraph};

pub fn normalize(graph: &mut StateMachineGraph) {
    let order = breadth_first(graph);

    let mut depths = vec![0u8; graph.state_count()];
    for &id in &order {
        if let Some(parent) = graph.state(id).parent
            && id != ROOT
        {
            depths[id.index()] = depths[parent.index()].saturating_add(1);
        }
    }

    let history_slots = assign_slots(
        graph,
        &order,
        |g, id| g.state(id).history != HistoryKind::None,
        |g, id| g.state(id).history_slot,
    );
    let timer_slots = assign_slots(
        graph,
        &order,
        |g, id| g.state(id).timer.is_some(),
        |g, id| g.state(id).timer.as_ref().and_then(|t| t.slot),
    );

    let states: Vec<StateId> = graph.states().map(|(id, _)| id).collect();
    for id in states {
        graph.state_mut(id).layout = None;
    }

    for (flat, &id) in order.iter().enumerate() {
        let initial_child = default_child(graph, id);
        graph.state_mut(id).layout = Some(StateLayout {
            flat_index: flat as u16,
            depth: depths[id.index()],
            initial_child,
            history_slot: history_slots.get(&id).copied(),
            timer_slot: timer_slots.get(&id).copied(),
        });
    }

    graph.order = order;
}

fn breadth_first(graph: &StateMachineGraph) -> Vec<StateId> {
    let mut order = Vec::with_capacity(graph.state_count());
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([ROOT]);
    seen.insert(ROOT);

    while let Some(id) = queue.pop_front() {
        order.push(id);
        for &child in &graph.state(id).children {
            // Children whose parent link disagrees are not part of the tree.
            if graph.state(child).parent == Some(id) && seen.insert(child) {
                queue.push_back(child);
            }
        }
    }
    order
}

/// Default child of a non-parallel composite: the one flagged initial,
/// else the first declared.
fn default_child(graph: &StateMachineGraph, id: StateId) -> Option<StateId> {
    let state = graph.state(id);
    if state.parallel || state.children.is_empty() {
        return None;
    }
    state
        .children
        .iter()
        .copied()
        .find(|&c| graph.state(c).initial)
        .or_else(|| state.children.first().copied())
}

fn assign_slots(
    graph: &StateMachineGraph,
    order: &[StateId],
    wants_slot: impl Fn(&StateMachineGraph, StateId) -> bool,
    explicit: impl Fn(&StateMachineGraph, StateId) -> Option<u16>,
) -> HashMap<StateId, u16> {
    let mut assigned = HashMap::new();
    let mut taken = BTreeSet::new();
    let mut pending = Vec::new();

    for &id in order {
        if !wants_slot(graph, id) {
            continue;
        }
        match explicit(graph, id) {
            Some(slot) => {
                taken.insert(slot);
                assigned.insert(id, slot);
            }
            None => pending.push(id),
        }
    }

    pending.sort_by_key(|&id| (graph.state(id).stable_id, id));
    let mut next = 0u16;
    for id in pending {
        while taken.contains(&next) {
            next += 1;
        }
        assigned.insert(id, next);
        next += 1;
    }
    assigned
}
