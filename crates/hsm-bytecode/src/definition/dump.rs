//! Human-readable definition dump.

use std::fmt::Write as _;

use hsm_core::{Colors, EVENT_EPSILON, EVENT_TIMER};

use crate::event::EventFlags;
use crate::metadata::MachineMetadata;

use super::NO_INDEX;
use super::module::Definition;
use super::records::{StateDef, TransitionDef};

/// Render every section of `def`. Names come from `meta` when given,
/// otherwise ids are printed raw.
pub fn dump(def: &Definition, meta: Option<&MachineMetadata>, colors: Colors) -> String {
    let mut out = String::new();
    let ctx = DumpContext::new(def, meta, colors);

    dump_header(&mut out, def, &ctx);
    dump_states(&mut out, def, &ctx);
    dump_transitions(&mut out, def, &ctx);
    dump_regions(&mut out, def, &ctx);
    dump_globals(&mut out, def, &ctx);
    dump_events(&mut out, def, &ctx);
    dump_ids(&mut out, "actions", 'A', def.action_ids(), |id| ctx.meta?.action_name(id), &ctx);
    dump_ids(&mut out, "guards", 'P', def.guard_ids(), |id| ctx.meta?.guard_name(id), &ctx);

    out
}

struct DumpContext<'a> {
    meta: Option<&'a MachineMetadata>,
    /// Width for state indices (S#).
    state_width: usize,
    /// Width for transition indices (T#).
    transition_width: usize,
    colors: Colors,
}

impl<'a> DumpContext<'a> {
    fn new(def: &Definition, meta: Option<&'a MachineMetadata>, colors: Colors) -> Self {
        Self {
            meta,
            state_width: width_for_count(def.state_count() as usize),
            transition_width: width_for_count(def.transition_count() as usize),
            colors,
        }
    }

    fn state(&self, index: u16) -> String {
        let w = self.state_width;
        let label = format!("S{index:0w$}");
        match self.meta.and_then(|m| m.state_name(index)) {
            Some(name) => format!("{label}({})", self.colors.paint(self.colors.blue, name)),
            None => label,
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

    fn section(&self, out: &mut String, title: &str) {
        let c = &self.colors;
        writeln!(out, "{}[{title}]{}", c.blue, c.reset).unwrap();
    }
}

fn named(id: u16, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("#{id:04x}"),
    }
}

/// Number of decimal digits needed to print indices below `count`.
fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10() as usize + 1
    }
}

fn dump_header(out: &mut String, def: &Definition, ctx: &DumpContext) {
    let h = def.header();
    let c = &ctx.colors;
    ctx.section(out, "header");
    if let Some(meta) = ctx.meta {
        writeln!(out, "machine   = {}", meta.name).unwrap();
    }
    writeln!(out, "version   = {}", h.version).unwrap();
    writeln!(out, "structure = {}{:#010x}{}", c.green, h.structure_hash, c.reset).unwrap();
    writeln!(out, "parameter = {}{:#010x}{}", c.green, h.parameter_hash, c.reset).unwrap();
    writeln!(out, "tier      = {}", def.tier()).unwrap();
    out.push('\n');
}

fn dump_states(out: &mut String, def: &Definition, ctx: &DumpContext) {
    ctx.section(out, "states");
    for (i, state) in def.states() {
        let mut line = ctx.state(i);
        write_state_fields(&mut line, &state, ctx);
        writeln!(out, "{line}").unwrap();
    }
    out.push('\n');
}

fn write_state_fields(line: &mut String, s: &StateDef, ctx: &DumpContext) {
    let c = &ctx.colors;
    if s.parent != NO_INDEX {
        write!(line, " {}^{}{}", c.dim, ctx.state(s.parent), c.reset).unwrap();
    }
    write!(line, " d{}", s.depth).unwrap();

    let kind = if s.is_parallel() {
        Some("parallel")
    } else if s.is_deep_history() {
        Some("deep-history")
    } else if s.is_history() {
        Some("history")
    } else if s.is_composite() {
        Some("composite")
    } else {
        None
    };
    if let Some(kind) = kind {
        write!(line, " {kind}").unwrap();
    }
    if s.initial_child != NO_INDEX {
        write!(line, " init={}", ctx.state(s.initial_child)).unwrap();
    }
    if s.entry_action != 0 {
        write!(line, " entry={}", ctx.action(s.entry_action)).unwrap();
    }
    if s.exit_action != 0 {
        write!(line, " exit={}", ctx.action(s.exit_action)).unwrap();
    }
    if s.activity_action != 0 {
        write!(line, " do={}", ctx.action(s.activity_action)).unwrap();
    }
    if s.history_slot != NO_INDEX {
        write!(line, " h{}", s.history_slot).unwrap();
    }
    if s.has_timer() {
        write!(line, " timer{}={}ms", s.timer_slot, s.timer_ms).unwrap();
        if s.timer_action != 0 {
            write!(line, " on-timer={}", ctx.action(s.timer_action)).unwrap();
        }
    }
    if s.output_lanes != 0 {
        write!(line, " lanes={:#010b}", s.output_lanes).unwrap();
    }
    if s.region_count > 0 {
        write!(line, " regions={}+{}", s.region_start, s.region_count).unwrap();
    }
    if s.transition_count > 0 {
        let w = ctx.transition_width;
        write!(line, " T{:0w$}+{}", s.transition_start, s.transition_count).unwrap();
    }
}

fn write_transition(line: &mut String, t: &TransitionDef, ctx: &DumpContext) {
    write!(line, " -> {} on {}", ctx.state(t.target), ctx.event(t.event)).unwrap();
    if t.guard != 0 {
        write!(line, " if {}", ctx.guard(t.guard)).unwrap();
    }
    if t.action != 0 {
        write!(line, " do {}", ctx.action(t.action)).unwrap();
    }
    write!(line, " p{} cost={}", t.priority, t.cost).unwrap();
    if t.is_internal() {
        line.push_str(" internal");
    }
    if t.sync_group != 0 {
        write!(line, " sync={}", t.sync_group).unwrap();
    }
}

fn dump_transitions(out: &mut String, def: &Definition, ctx: &DumpContext) {
    let w = ctx.transition_width;
    ctx.section(out, "transitions");
    for i in 0..def.transition_count() {
        let t = def.transition(i);
        let mut line = format!("T{i:0w$} {}", ctx.state(t.source));
        write_transition(&mut line, &t, ctx);
        writeln!(out, "{line}").unwrap();
    }
    out.push('\n');
}

fn dump_regions(out: &mut String, def: &Definition, ctx: &DumpContext) {
    if def.region_count() == 0 {
        return;
    }
    ctx.section(out, "regions");
    for i in 0..def.region_count() {
        let r = def.region(i);
        writeln!(
            out,
            "R{i} {}[{}] root={} states={}",
            ctx.state(r.owner),
            r.index,
            ctx.state(r.root),
            r.state_count
        )
        .unwrap();
    }
    out.push('\n');
}

fn dump_globals(out: &mut String, def: &Definition, ctx: &DumpContext) {
    if def.global_transition_count() == 0 {
        return;
    }
    ctx.section(out, "globals");
    for (i, t) in def.global_transitions() {
        let mut line = format!("G{i} *");
        write_transition(&mut line, &t, ctx);
        writeln!(out, "{line}").unwrap();
    }
    out.push('\n');
}

fn dump_events(out: &mut String, def: &Definition, ctx: &DumpContext) {
    ctx.section(out, "events");
    for i in 0..def.event_count() {
        let e = def.event(i);
        let mut line = format!("E{}", e.id);
        if let Some(name) = ctx.meta.and_then(|m| m.event_name(e.id)) {
            write!(line, " {name}").unwrap();
        }
        write!(line, " {:?}", e.priority).unwrap();
        if e.flags.contains(EventFlags::DEFERRED) {
            line.push_str(" deferred");
        }
        if e.flags.contains(EventFlags::BY_REFERENCE) {
            line.push_str(" by-ref");
        }
        writeln!(out, "{line}").unwrap();
    }
    out.push('\n');
}

fn dump_ids<'m>(
    out: &mut String,
    title: &str,
    prefix: char,
    ids: impl Iterator<Item = u16>,
    name: impl Fn(u16) -> Option<&'m str>,
    ctx: &DumpContext,
) {
    ctx.section(out, title);
    for (i, id) in ids.enumerate() {
        match name(id) {
            Some(n) => writeln!(out, "{prefix}{i} #{id:04x} {n}").unwrap(),
            None => writeln!(out, "{prefix}{i} #{id:04x}").unwrap(),
        }
    }
    out.push('\n');
}
