//! Transition selection.

use hsm_bytecode::{HsmEvent, NO_INDEX, TransitionDef};
use hsm_core::EVENT_TIMER;

use super::run::Run;
use crate::trace::Tracer;

impl<C, T: Tracer> Run<'_, '_, '_, C, T> {
    /// Best enabled transition for `event`.
    ///
    /// Globals are tried first, in table order. Otherwise every active
    /// leaf's chain is walked upward and the highest priority transition
    /// whose guard passes wins; on equal priority the first one found
    /// (innermost state, then table order) is kept.
    pub(super) fn select(&mut self, event: &HsmEvent) -> Option<TransitionDef> {
        for index in 0..self.def.global_transition_count() {
            let global = self.def.global_transition(index);
            if global.event == event.id && self.check_guard(global.guard, event.id) {
                return Some(global);
            }
        }

        let timer_owner = event.timer_source().map(|(_, state)| state);
        let mut best: Option<TransitionDef> = None;
        let all = u8::MAX;

        for slot in 0..self.view.leaf_capacity() {
            let leaf = self.view.leaf(slot);
            if leaf == NO_INDEX {
                break;
            }
            let mut state = leaf;
            while state != NO_INDEX && !self.reached_earlier(state, slot, all) {
                let s = self.def.state(state);
                for index in s.transitions() {
                    let t = self.def.transition(index);
                    if t.event != event.id {
                        continue;
                    }
                    if t.event == EVENT_TIMER && timer_owner != Some(state) {
                        continue;
                    }
                    // Sorted by descending priority within a state.
                    if best.is_some_and(|b| b.priority >= t.priority) {
                        break;
                    }
                    if self.check_guard(t.guard, event.id) {
                        best = Some(t);
                        break;
                    }
                }
                state = s.parent;
            }
        }
        best
    }
}
