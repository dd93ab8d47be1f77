use crate::tier::Tier;

use super::test_utils::{parallel_sections, two_state_sections};
use super::{Definition, HEADER_SIZE, ModuleError, NO_INDEX, Sections};

fn load(sections: &Sections) -> Definition {
    Definition::from_bytes(sections.encode(0xABCD, 0x1234)).unwrap()
}

#[test]
fn encode_then_load() {
    let def = load(&two_state_sections());

    assert_eq!(def.structure_hash(), 0xABCD);
    assert_eq!(def.parameter_hash(), 0x1234);
    assert_eq!(def.state_count(), 3);
    assert_eq!(def.transition_count(), 2);
    assert_eq!(def.bytes().len(), HEADER_SIZE + 3 * 32 + 2 * 16 + 4 + 2 * 2 + 2);
    assert_eq!(def.state(2).timer_ms, 500);
    assert_eq!(def.transition(0).guard, 0x2222);
    assert_eq!(def.action_ids().collect::<Vec<_>>(), vec![0x1111, 0x3333]);
    assert_eq!(def.guard_ids().collect::<Vec<_>>(), vec![0x2222]);
    assert_eq!(def.event_def(2).map(|e| e.id), Some(2));
    assert!(def.event_def(9).is_none());
}

#[test]
fn shape_and_tier() {
    let def = load(&two_state_sections());
    let shape = def.shape();
    assert_eq!(shape.user_states, 2);
    assert_eq!(shape.max_depth, 1);
    assert_eq!(shape.timer_slots, 1);
    assert_eq!(shape.max_leaves, 1);
    assert_eq!(def.tier(), Tier::Tier64);

    let def = load(&parallel_sections());
    assert_eq!(def.shape().max_leaves, 2);
    assert_eq!(def.shape().regions, 2);
    assert_eq!(def.tier(), Tier::Tier128);
}

#[test]
fn ancestry() {
    let def = load(&parallel_sections());
    assert!(def.is_ancestor_or_self(1, 7));
    assert!(def.is_ancestor_or_self(7, 7));
    assert!(!def.is_ancestor_or_self(2, 7));

    let mut chain = [NO_INDEX; 16];
    let len = def.ancestor_chain(7, &mut chain);
    assert_eq!(&chain[..len], &[0, 1, 3, 7]);
}

#[test]
fn globals_are_separate() {
    let def = load(&parallel_sections());
    let globals: Vec<_> = def.global_transitions().collect();
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0].1.source, NO_INDEX);
    assert!(globals[0].1.is_global());
    assert_eq!(def.region(1).root, 3);
}

#[test]
fn rejects_corruption() {
    let bytes = two_state_sections().encode(1, 2);

    let mut bad = bytes.clone();
    bad[0] = b'X';
    assert!(matches!(Definition::from_bytes(bad), Err(ModuleError::InvalidMagic)));

    let mut bad = bytes.clone();
    bad[4] = 9;
    assert!(matches!(
        Definition::from_bytes(bad),
        Err(ModuleError::UnsupportedVersion(9))
    ));

    let mut bad = bytes.clone();
    bad.pop();
    assert!(matches!(
        Definition::from_bytes(bad),
        Err(ModuleError::SizeMismatch { .. })
    ));

    let mut bad = bytes.clone();
    let last = bad.len() - 1;
    bad[last] ^= 0xFF;
    assert!(matches!(
        Definition::from_bytes(bad),
        Err(ModuleError::ChecksumMismatch { .. })
    ));

    assert!(matches!(
        Definition::from_bytes(bytes[..10].to_vec()),
        Err(ModuleError::FileTooSmall(10))
    ));
}

#[test]
fn empty_definition_has_no_root() {
    let bytes = Sections::default().encode(0, 0);
    assert!(matches!(
        Definition::from_bytes(bytes),
        Err(ModuleError::MissingRoot)
    ));
}

#[test]
fn module_error_display() {
    assert_eq!(ModuleError::InvalidMagic.to_string(), "invalid magic: expected FHSM");
    let err = ModuleError::ChecksumMismatch {
        expected: 1,
        actual: 2,
    };
    assert_eq!(
        err.to_string(),
        "checksum mismatch: header says 0x00000001, body is 0x00000002"
    );
}

#[test]
#[should_panic(expected = "state index 3 out of range (count 3)")]
fn out_of_range_state_panics() {
    load(&two_state_sections()).state(3);
}
