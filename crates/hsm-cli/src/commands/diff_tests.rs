use std::path::{Path, PathBuf};

use hsm_bytecode::Definition;
use hsm_compiler::{ROOT, StateMachineGraph, Trigger, compile};
use hsm_core::Colors;
use hsm_vm::ReloadOutcome;

use super::diff::{DiffArgs, describe, render};

/// `Closed <-> Open`, optionally with an auto-close timer on `Open` and an
/// extra `Locked` state.
fn door(timer: Option<u16>, locked: bool) -> StateMachineGraph {
    let mut g = StateMachineGraph::new("Door");
    g.declare_event("open").unwrap();
    g.declare_event("close").unwrap();
    let closed = g.add_state("Closed", ROOT).unwrap();
    let open = g.add_state("Open", ROOT).unwrap();
    if locked {
        g.add_state("Locked", ROOT).unwrap();
    }
    if let Some(ms) = timer {
        g.state_mut(open).timer(ms);
    }
    g.add_transition(closed, Some(open), Trigger::event("open"));
    g.add_transition(open, Some(closed), Trigger::event("close"));
    g
}

fn write(dir: &Path, name: &str, mut graph: StateMachineGraph) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, compile(&mut graph).unwrap().bytes()).unwrap();
    path
}

fn diff(old: StateMachineGraph, new: StateMachineGraph) -> String {
    let dir = tempfile::tempdir().unwrap();
    let args = DiffArgs {
        old: write(dir.path(), "old.fhsm", old),
        new: write(dir.path(), "new.fhsm", new),
        color: false,
    };
    render(&args).unwrap()
}

fn verdict(out: &str) -> &str {
    out.lines().last().unwrap()
}

#[test]
fn identical_blobs_need_no_reload() {
    let out = diff(door(None, false), door(None, false));
    assert_eq!(verdict(&out), "no change");
}

#[test]
fn rewired_blob_reloads_softly() {
    let out = diff(door(None, false), door(Some(500), false));
    assert_eq!(verdict(&out), "soft reload: running instances keep their state");
}

#[test]
fn new_topology_forces_hard_reset() {
    let out = diff(door(None, false), door(None, true));
    assert!(verdict(&out).starts_with("hard reset: instances of 0x"));
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn describe_prints_both_hashes() {
    let old: Definition = compile(&mut door(None, false)).unwrap().into_parts().0;
    let new: Definition = compile(&mut door(Some(500), false)).unwrap().into_parts().0;
    let out = describe(&old, &new, ReloadOutcome::SoftReload, Colors::OFF);

    let expected = format!(
        "structure = {:#010x} -> {:#010x}\n\
         parameter = {:#010x} -> {:#010x}\n\
         soft reload: running instances keep their state\n",
        old.structure_hash(),
        new.structure_hash(),
        old.parameter_hash(),
        new.parameter_hash(),
    );
    assert_eq!(out, expected);
}

#[test]
fn colored_verdict_for_hard_reset() {
    let def: Definition = compile(&mut door(None, false)).unwrap().into_parts().0;
    let c = Colors::ON;
    let out = describe(&def, &def, ReloadOutcome::HardReset { old: 1, new: 2 }, c);
    let expected = format!(
        "{}hard reset: instances of 0x00000001 restart as 0x00000002{}",
        c.red, c.reset
    );
    assert_eq!(verdict(&out), expected);
}
