//! Transition execution: exit to the LCA, run the effect, enter the target.

use std::cmp::Reverse;

use hsm_bytecode::{NO_INDEX, StateDef, StatusFlags, TransitionDef};

use super::run::{CHAIN_LEN, MAX_ACTIVE, ROOT, Run};
use crate::trace::{ActionKind, Tracer};

impl<C, T: Tracer> Run<'_, '_, '_, C, T> {
    pub(super) fn fire(&mut self, t: &TransitionDef, event: u16) {
        let instance = self.ctx.instance;
        self.ctx.tracer.trace_transition(instance, t.source, t.target, event);
        if t.is_internal() {
            self.run_action(ActionKind::Effect, t.action, t.source);
            return;
        }

        let lca = if t.is_global() {
            ROOT
        } else {
            self.lca(t.source, t.target)
        };
        self.exit_below(lca);
        self.run_action(ActionKind::Effect, t.action, t.source);

        let mut chain = [NO_INDEX; CHAIN_LEN];
        let len = self.def.ancestor_chain(t.target, &mut chain);
        let from = self.def.state(lca).depth as usize + 1;
        if from < len {
            self.enter_path(&chain[from..len]);
        }
    }

    /// Least common ancestor of a transition's ends. Moves up a level when
    /// one end contains the other, and past parallel states.
    fn lca(&self, source: u16, target: u16) -> u16 {
        let mut a = [NO_INDEX; CHAIN_LEN];
        let mut b = [NO_INDEX; CHAIN_LEN];
        let la = self.def.ancestor_chain(source, &mut a);
        let lb = self.def.ancestor_chain(target, &mut b);

        let mut lca = ROOT;
        for (x, y) in a[..la].iter().zip(&b[..lb]) {
            if x != y {
                break;
            }
            lca = *x;
        }
        if lca == source || lca == target {
            lca = self.parent_or_root(lca);
        }
        while lca != ROOT && self.def.state(lca).is_parallel() {
            lca = self.parent_or_root(lca);
        }
        lca
    }

    fn parent_or_root(&self, state: u16) -> u16 {
        match self.def.parent(state) {
            NO_INDEX => ROOT,
            parent => parent,
        }
    }

    /// Exit every active state strictly below `lca`, deepest first, then
    /// drop the leaves that were under it.
    fn exit_below(&mut self, lca: u16) {
        let mut exiting = [NO_INDEX; MAX_ACTIVE];
        let mut n = 0;
        for leaf in self.view.active_leaves() {
            if leaf == lca || !self.def.is_ancestor_or_self(lca, leaf) {
                continue;
            }
            let mut state = leaf;
            while state != lca && state != NO_INDEX {
                if !exiting[..n].contains(&state) {
                    exiting[n] = state;
                    n += 1;
                }
                state = self.def.parent(state);
            }
        }

        let exiting = &mut exiting[..n];
        exiting.sort_unstable_by_key(|&s| (Reverse(self.def.state(s).depth), s));
        for &state in exiting.iter() {
            self.exit_state(state);
        }
        self.remove_leaves_below(lca);
    }

    fn exit_state(&mut self, state: u16) {
        let s = self.def.state(state);
        if s.is_history()
            && s.history_slot != NO_INDEX
            && let Some(saved) = self.active_descendant(state, s.is_deep_history())
        {
            self.view.set_history(s.history_slot as usize, saved);
        }
        if s.has_timer() {
            self.view.set_timer(s.timer_slot as usize, 0);
        }
        self.ctx.tracer.trace_exit(self.ctx.instance, state);
        self.run_action(ActionKind::Exit, s.exit_action, state);
    }

    /// What a history state remembers: its active child (shallow) or the
    /// active leaf under it (deep).
    fn active_descendant(&self, state: u16, deep: bool) -> Option<u16> {
        let leaf = self
            .view
            .active_leaves()
            .find(|&leaf| leaf != state && self.def.is_ancestor_or_self(state, leaf))?;
        if deep {
            return Some(leaf);
        }
        let mut child = leaf;
        while self.def.parent(child) != state {
            child = self.def.parent(child);
        }
        Some(child)
    }

    fn remove_leaves_below(&mut self, lca: u16) {
        let capacity = self.view.leaf_capacity();
        let mut write = 0;
        for read in 0..capacity {
            let leaf = self.view.leaf(read);
            if leaf == NO_INDEX {
                break;
            }
            if leaf != lca && self.def.is_ancestor_or_self(lca, leaf) {
                continue;
            }
            self.view.set_leaf(write, leaf);
            write += 1;
        }
        for slot in write..capacity {
            self.view.set_leaf(slot, NO_INDEX);
        }
    }

    /// Enter `chain` top-down (each element the child of the previous),
    /// then settle the last one. Sibling regions of parallel states on the
    /// way are entered by default.
    fn enter_path(&mut self, chain: &[u16]) {
        let Some((&state, rest)) = chain.split_first() else {
            return;
        };
        self.enter_state(state);
        let Some(&next) = rest.first() else {
            self.descend(state);
            return;
        };
        let s = self.def.state(state);
        if s.is_parallel() {
            for child in s.children() {
                if child == next {
                    self.enter_path(rest);
                } else {
                    self.enter_state(child);
                    self.descend(child);
                }
            }
        } else {
            self.enter_path(rest);
        }
    }

    fn enter_state(&mut self, state: u16) {
        let s = self.def.state(state);
        let instance = self.ctx.instance;
        self.ctx.tracer.trace_enter(instance, state);
        if s.has_timer() {
            let duration = s.timer_ms.max(1);
            self.view.set_timer(s.timer_slot as usize, duration as u32);
            self.ctx
                .tracer
                .trace_timer_armed(instance, s.timer_slot, state, duration);
        }
        self.run_action(ActionKind::Entry, s.entry_action, state);
    }

    /// Below an entered `state`: register it as a leaf, enter every region
    /// of a parallel state, or pick one child (from history when it holds
    /// a valid descendant, else the initial child).
    pub(super) fn descend(&mut self, state: u16) {
        let s = self.def.state(state);
        if s.is_leaf() {
            self.add_leaf(state);
            return;
        }
        if s.is_parallel() {
            for child in s.children() {
                self.enter_state(child);
                self.descend(child);
            }
            return;
        }

        if let Some(saved) = self.restorable(state, &s) {
            if s.is_deep_history() {
                let mut chain = [NO_INDEX; CHAIN_LEN];
                let len = self.def.ancestor_chain(saved, &mut chain);
                self.enter_path(&chain[s.depth as usize + 1..len]);
            } else {
                self.enter_state(saved);
                self.descend(saved);
            }
            return;
        }

        let child = match s.initial_child {
            NO_INDEX => s.first_child,
            child => child,
        };
        self.enter_state(child);
        self.descend(child);
    }

    /// Saved history of `state`, if it still names a proper descendant (a
    /// direct child for shallow history).
    fn restorable(&self, state: u16, s: &StateDef) -> Option<u16> {
        if !s.is_history() || s.history_slot == NO_INDEX {
            return None;
        }
        let saved = self.view.history(s.history_slot as usize);
        if saved == NO_INDEX || saved == state || saved >= self.def.state_count() {
            return None;
        }
        if !self.def.is_ancestor_or_self(state, saved) {
            return None;
        }
        if !s.is_deep_history() && self.def.parent(saved) != state {
            return None;
        }
        Some(saved)
    }

    fn add_leaf(&mut self, state: u16) {
        for slot in 0..self.view.leaf_capacity() {
            if self.view.leaf(slot) == NO_INDEX {
                self.view.set_leaf(slot, state);
                return;
            }
        }
        self.view.insert_status(StatusFlags::LEAF_OVERFLOW);
        self.ctx.tracer.trace_leaf_overflow(self.ctx.instance, state);
    }
}
