use hsm_core::Colors;

use crate::metadata::MachineMetadata;

use super::test_utils::{parallel_sections, two_state_sections};
use super::{Definition, dump};

#[test]
fn dump_raw_ids() {
    let def = Definition::from_bytes(two_state_sections().encode(0xABCD, 0x1234)).unwrap();

    insta::assert_snapshot!(dump(&def, None, Colors::OFF), @r"
    [header]
    version   = 1
    structure = 0x0000abcd
    parameter = 0x00001234
    tier      = 64B

    [states]
    S0 d0 composite init=S1
    S1 ^S0 d1 entry=#3333 T0+1
    S2 ^S0 d1 do=#3333 timer0=500ms T1+1

    [transitions]
    T0 S1 -> S2 on E2 if #2222 do #1111 p3 cost=2
    T1 S2 -> S1 on timer p0 cost=2

    [events]
    E2 Normal

    [actions]
    A0 #1111
    A1 #3333

    [guards]
    P0 #2222
    ");
}

#[test]
fn dump_with_names() {
    let def = Definition::from_bytes(two_state_sections().encode(1, 2)).unwrap();
    let meta = MachineMetadata {
        name: "Worker".into(),
        states: vec!["<root>".into(), "Idle".into(), "Busy".into()],
        events: [(2, "job".to_string())].into(),
        actions: [(0x1111, "Start".to_string())].into(),
        guards: [(0x2222, "HasJob".to_string())].into(),
    };

    let out = dump(&def, Some(&meta), Colors::OFF);

    assert!(out.contains("machine   = Worker"));
    assert!(out.contains("T0 S1(Idle) -> S2(Busy) on job if HasJob do Start p3 cost=2"));
    assert!(out.contains("E2 job Normal"));
    assert!(out.contains("P0 #2222 HasJob"));
}

#[test]
fn dump_parallel_sections() {
    let def = Definition::from_bytes(parallel_sections().encode(7, 8)).unwrap();
    let out = dump(&def, None, Colors::OFF);

    assert!(out.contains("S1 ^S0 d1 parallel regions=0+2"));
    assert!(out.contains("R0 S1[0] root=S2 states=3"));
    assert!(out.contains("[globals]\nG0 * -> S1 on E3 p0 cost=1"));
    assert!(out.contains("tier      = 128B"));
}

#[test]
fn dump_colors() {
    let def = Definition::from_bytes(two_state_sections().encode(1, 2)).unwrap();
    let out = dump(&def, None, Colors::ON);
    assert!(out.starts_with("\x1b[34m[header]\x1b[0m"));
}
