use std::path::{Path, PathBuf};

use hsm_compiler::{ROOT, StateMachineGraph, Trigger, compile};
use indoc::indoc;

use super::dump::{DumpArgs, render};
use super::load::LoadError;

/// Write the `Door` machine's blob and metadata into `dir`.
fn write_door(dir: &Path) -> (PathBuf, PathBuf) {
    let mut g = StateMachineGraph::new("Door");
    g.declare_event("open").unwrap();
    g.declare_event("close").unwrap();
    let closed = g.add_state("Closed", ROOT).unwrap();
    let open = g.add_state("Open", ROOT).unwrap();
    g.add_transition(closed, Some(open), Trigger::event("open"));
    g.add_transition(open, Some(closed), Trigger::event("close"));
    let compiled = compile(&mut g).unwrap();

    let blob = dir.join("door.fhsm");
    let meta = dir.join("door.json");
    std::fs::write(&blob, compiled.bytes()).unwrap();
    std::fs::write(&meta, compiled.metadata().to_json().unwrap()).unwrap();
    (blob, meta)
}

#[test]
fn dump_with_metadata_prints_names() {
    let dir = tempfile::tempdir().unwrap();
    let (blob, meta) = write_door(dir.path());

    let out = render(&DumpArgs {
        blob,
        meta: Some(meta),
        color: false,
    })
    .unwrap();

    assert!(out.starts_with(indoc! {"
        [header]
        machine   = Door
        version   = 1
    "}));
    assert!(out.contains("(Closed)"));
    assert!(out.contains("on open"));
}

#[test]
fn dump_without_metadata_prints_ids() {
    let dir = tempfile::tempdir().unwrap();
    let (blob, _) = write_door(dir.path());

    let out = render(&DumpArgs {
        blob,
        meta: None,
        color: false,
    })
    .unwrap();

    assert!(out.starts_with("[header]\nversion   = 1\n"));
    assert!(!out.contains("Closed"));
}

#[test]
fn missing_blob_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = render(&DumpArgs {
        blob: dir.path().join("nope.fhsm"),
        meta: None,
        color: false,
    })
    .unwrap_err();
    assert!(matches!(err, LoadError::Definition { .. }));
    assert!(err.to_string().starts_with("cannot load `"));
}

#[test]
fn garbage_blob_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let blob = dir.path().join("junk.fhsm");
    std::fs::write(&blob, [0u8; 64]).unwrap();

    let err = render(&DumpArgs {
        blob,
        meta: None,
        color: false,
    })
    .unwrap_err();
    assert!(err.to_string().ends_with("invalid magic: expected FHSM"));
}

#[test]
fn bad_metadata_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (blob, meta) = write_door(dir.path());
    std::fs::write(&meta, "{ not json").unwrap();

    let err = render(&DumpArgs {
        blob,
        meta: Some(meta),
        color: false,
    })
    .unwrap_err();
    assert!(matches!(err, LoadError::Metadata { .. }));
}

#[test]
fn metadata_for_another_machine_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (blob, meta) = write_door(dir.path());
    std::fs::write(&meta, r#"{ "name": "Other", "states": ["root"] }"#).unwrap();

    let err = render(&DumpArgs {
        blob,
        meta: Some(meta),
        color: false,
    })
    .unwrap_err();
    insta::assert_snapshot!(err, @"metadata names 1 states, definition has 3");
}
