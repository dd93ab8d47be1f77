//! Human-readable rendering of trace records.

use std::fmt::Write as _;

use hsm_bytecode::{EventPriority, MachineMetadata, NO_INDEX};
use hsm_core::{Colors, EVENT_EPSILON, EVENT_TIMER};

use super::{ActionKind, TraceOpcode, TraceRecord};

/// Resolves ids in trace records to names from a metadata side table.
///
/// Without metadata, states print as `S<index>`, events as `E<id>` and
/// actions/guards as `#<hex id>`.
pub struct Symbolicator<'m> {
    meta: Option<&'m MachineMetadata>,
    colors: Colors,
}

impl<'m> Symbolicator<'m> {
    pub fn new(meta: Option<&'m MachineMetadata>, colors: Colors) -> Self {
        Self { meta, colors }
    }

    /// One line per record, each terminated by a newline.
    pub fn render(&self, records: impl IntoIterator<Item = TraceRecord>) -> String {
        let mut out = String::new();
        for record in records {
            writeln!(out, "{}", self.line(&record)).expect("String write never fails");
        }
        out
    }

    pub fn line(&self, r: &TraceRecord) -> String {
        let c = &self.colors;
        let [a, b, d, _] = r.args;
        let body = match r.opcode {
            TraceOpcode::Event => match EventPriority::from_u8(b as u8) {
                EventPriority::Normal => format!("event {}", self.event(a)),
                EventPriority::Low => format!("event {} (low)", self.event(a)),
                EventPriority::Interrupt => format!("event {} (interrupt)", self.event(a)),
            },
            TraceOpcode::EventDropped => {
                c.paint(c.yellow, format!("dropped {}", self.event(a)))
            }
            TraceOpcode::Transition => {
                format!("transition {} -> {} on {}", self.state(a), self.state(b), self.event(d))
            }
            TraceOpcode::Enter => format!("enter {}", self.state(a)),
            TraceOpcode::Exit => format!("exit {}", self.state(a)),
            TraceOpcode::RtcOverflow => {
                c.paint(c.red, format!("error: run-to-completion exceeded {a} steps"))
            }
            TraceOpcode::LeafOverflow => {
                c.paint(c.red, format!("error: no leaf slot for {}", self.state(a)))
            }
            TraceOpcode::Action => {
                let kind = ActionKind::from_u8(r.aux).map_or("?", ActionKind::as_str);
                format!("action {} ({kind} {})", self.action(a), self.state(b))
            }
            TraceOpcode::TimerArmed => {
                format!("timer {a} armed {d}ms ({})", self.state(b))
            }
            TraceOpcode::TimerFired => format!("timer {a} fired ({})", self.state(b)),
            TraceOpcode::Guard => {
                let verdict = if r.aux != 0 { "pass" } else { "fail" };
                format!("guard {} {verdict} on {}", self.guard(a), self.event(b))
            }
            TraceOpcode::Activity => {
                format!("activity {} ({})", self.action(a), self.state(b))
            }
            TraceOpcode::Conflict => c.paint(
                c.yellow,
                format!(
                    "conflict lanes {:#010b}: {} over {}",
                    r.aux,
                    self.state(a),
                    self.state(b)
                ),
            ),
        };
        format!("{}t{} #{}{} {body}", c.dim, r.tick, r.instance, c.reset)
    }

    fn state(&self, index: u16) -> String {
        if index == NO_INDEX {
            return "*".to_string();
        }
        match self.meta.and_then(|m| m.state_name(index)) {
            Some(name) => self.colors.paint(self.colors.blue, name),
            None => format!("S{index}"),
        }
    }

    fn event(&self, id: u16) -> String {
        match id {
            EVENT_EPSILON => "ε".to_string(),
            EVENT_TIMER => "timer".to_string(),
            _ => self
                .meta
                .and_then(|m| m.event_name(id))
                .map(str::to_string)
                .unwrap_or_else(|| format!("E{id}")),
        }
    }

    fn action(&self, id: u16) -> String {
        named(id, self.meta.and_then(|m| m.action_name(id)))
    }

    fn guard(&self, id: u16) -> String {
        named(id, self.meta.and_then(|m| m.guard_name(id)))
    }
}

fn named(id: u16, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("#{id:04x}"),
    }
}
