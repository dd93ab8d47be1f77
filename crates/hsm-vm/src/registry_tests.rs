use std::sync::Arc;
use std::thread;

use crate::registry::DefinitionRegistry;
use crate::test_utils::{build, chain, patrol};

#[test]
fn definitions_are_keyed_by_structure_hash() {
    let registry = DefinitionRegistry::new();
    assert!(registry.is_empty());

    let (patrol_def, _) = build(patrol());
    let (chain_def, _) = build(chain(5));
    let patrol_id = patrol_def.structure_hash();
    let chain_id = chain_def.structure_hash();
    assert!(registry.insert(Arc::new(patrol_def)).is_none());
    assert!(registry.insert(Arc::new(chain_def)).is_none());

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(patrol_id));
    assert_eq!(registry.get(chain_id).unwrap().state_count(), 6);

    let mut ids = vec![patrol_id, chain_id];
    ids.sort_unstable();
    assert_eq!(registry.machine_ids(), ids);
}

#[test]
fn same_topology_replaces_previous_entry() {
    let registry = DefinitionRegistry::new();
    let (first, _) = build(patrol());
    let (second, _) = build(patrol());
    let id = first.structure_hash();

    registry.insert(Arc::new(first));
    let replaced = registry.insert(Arc::new(second));
    assert_eq!(replaced.map(|d| d.structure_hash()), Some(id));
    assert_eq!(registry.len(), 1);

    assert!(registry.remove(id).is_some());
    assert!(registry.get(id).is_none());
    assert!(registry.remove(id).is_none());
}

#[test]
fn readers_share_definitions_across_threads() {
    let registry = DefinitionRegistry::new();
    let (def, _) = build(chain(3));
    let id = def.structure_hash();
    registry.insert(Arc::new(def));

    let counts: Vec<u16> = thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|_| s.spawn(|| registry.get(id).map(|d| d.state_count())))
            .collect();
        readers
            .into_iter()
            .filter_map(|r| r.join().unwrap())
            .collect()
    });
    assert_eq!(counts, [4, 4, 4, 4]);
}
