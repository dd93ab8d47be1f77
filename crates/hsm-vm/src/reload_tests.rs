use std::sync::Arc;

use hsm_bytecode::{Definition, Instance64, InstanceStorage, Phase, Tier, TieredInstance};

use crate::registry::DefinitionRegistry;
use crate::reload::{HotReloadManager, ReloadOutcome};
use crate::test_utils::{build, chain, patrol, timed_patrol};

fn patrol_def() -> Definition {
    build(patrol()).0
}

/// Patrol with a timer on `A`: same topology, different wiring.
fn patrol_with_timer() -> Definition {
    let mut g = patrol();
    let a = g.lookup("A").unwrap();
    g.state_mut(a).timer(250);
    build(g).0
}

#[test]
fn classify_outcomes() {
    let base = patrol_def();
    let retimed = patrol_with_timer();
    let other = build(chain(4)).0;

    assert_eq!(ReloadOutcome::classify(None, &base), ReloadOutcome::NewMachine);
    assert_eq!(
        ReloadOutcome::classify(Some(&base), &patrol_def()),
        ReloadOutcome::NoChange
    );

    assert_eq!(base.structure_hash(), retimed.structure_hash());
    assert_eq!(
        ReloadOutcome::classify(Some(&base), &retimed),
        ReloadOutcome::SoftReload
    );

    let outcome = ReloadOutcome::classify(Some(&base), &other);
    assert_eq!(
        outcome,
        ReloadOutcome::HardReset {
            old: base.structure_hash(),
            new: other.structure_hash(),
        }
    );
    assert!(outcome.requires_reset());
    assert!(!ReloadOutcome::SoftReload.requires_reset());
}

#[test]
fn growing_tier_forces_hard_reset() {
    let base = patrol_def();
    let timed = build(timed_patrol()).0;
    assert_eq!(base.structure_hash(), timed.structure_hash());
    assert!(timed.tier() > base.tier());

    let hash = base.structure_hash();
    let outcome = ReloadOutcome::classify(Some(&base), &timed);
    assert_eq!(outcome, ReloadOutcome::HardReset { old: hash, new: hash });

    // Shrinking back fits in the old storage again.
    assert_eq!(
        ReloadOutcome::classify(Some(&timed), &base),
        ReloadOutcome::SoftReload
    );

    let mut old = Instance64::new(hash, 5);
    old.view().set_phase(Phase::Activity);
    assert!(outcome.apply(&mut old.view()));
    assert_eq!(old.generation(), 1);

    let mut moved = TieredInstance::new(timed.tier(), hash, 5);
    assert_eq!(moved.tier(), Tier::Tier128);
    assert_eq!(moved.view().phase(), Some(Phase::Idle));
}

#[test]
fn hard_reset_rebinds_only_old_instances() {
    let outcome = ReloadOutcome::HardReset { old: 10, new: 20 };
    let mut instances = [
        Instance64::new(10, 5),
        Instance64::new(99, 5),
        Instance64::new(10, 5),
    ];
    let mut view = instances[0].view();
    view.set_phase(Phase::Activity);
    view.set_leaf(0, 3);

    assert_eq!(outcome.apply_all(&mut instances), 2);
    assert_eq!(
        instances.iter().map(|i| i.machine_id()).collect::<Vec<_>>(),
        [20, 99, 20]
    );

    let view = instances[0].view();
    assert_eq!(view.generation(), 1);
    assert_eq!(view.phase(), Some(Phase::Idle));
    assert!(!view.is_initialized());
    assert_eq!(instances[1].generation(), 0);
}

#[test]
fn soft_reload_leaves_instances_alone() {
    let mut inst = Instance64::new(10, 5);
    let before = inst.clone();
    assert!(!ReloadOutcome::SoftReload.apply(&mut inst.view()));
    assert!(!ReloadOutcome::NoChange.apply(&mut inst.view()));
    assert_eq!(inst, before);
}

#[test]
fn manager_tracks_versions_by_name() {
    let registry = Arc::new(DefinitionRegistry::new());
    let mut manager = HotReloadManager::with_registry(Arc::clone(&registry));

    let base = Arc::new(patrol_def());
    let base_id = base.structure_hash();
    assert_eq!(manager.load("guard", Arc::clone(&base)), ReloadOutcome::NewMachine);
    assert!(registry.contains(base_id));

    assert_eq!(manager.load("guard", Arc::new(patrol_def())), ReloadOutcome::NoChange);
    assert!(Arc::ptr_eq(manager.current("guard").unwrap(), &base));

    let retimed = Arc::new(patrol_with_timer());
    assert_eq!(manager.load("guard", Arc::clone(&retimed)), ReloadOutcome::SoftReload);
    assert!(Arc::ptr_eq(&registry.get(base_id).unwrap(), &retimed));

    let other = Arc::new(build(chain(4)).0);
    let other_id = other.structure_hash();
    assert_eq!(
        manager.load("guard", other),
        ReloadOutcome::HardReset {
            old: base_id,
            new: other_id
        }
    );
    assert!(!registry.contains(base_id));
    assert_eq!(registry.machine_ids(), [other_id]);
    assert_eq!(manager.current("guard").unwrap().structure_hash(), other_id);
}

#[test]
fn names_are_tracked_independently() {
    let mut manager = HotReloadManager::new();
    let def = Arc::new(patrol_def());
    assert_eq!(manager.load("left", Arc::clone(&def)), ReloadOutcome::NewMachine);
    assert_eq!(manager.load("right", def), ReloadOutcome::NewMachine);
    assert!(manager.current("middle").is_none());
}
