use std::collections::BTreeSet;

use avl_trace::{assert_snapshot_tree, AvlEngine};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Insert(i32),
    Remove(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-64i32..64).prop_map(Op::Insert),
        2 => (-64i32..64).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn every_snapshot_is_ordered_with_correct_heights(ops in prop::collection::vec(op(), 1..200)) {
        let mut avl = AvlEngine::new();
        let mut model = BTreeSet::new();

        for op in ops {
            let before = avl.tree();
            let (trace, changed) = match op {
                Op::Insert(k) => (avl.insert(k), model.insert(k)),
                Op::Remove(k) => (avl.remove(k), model.remove(&k)),
            };

            prop_assert!(trace.snapshots.len() >= 2);
            prop_assert_eq!(&trace.snapshots[0].tree, &before);
            prop_assert_eq!(&trace.snapshots.last().unwrap().tree, &trace.tree);
            if changed {
                prop_assert_eq!(trace.snapshots.len(), trace.events.len() + 1);
            } else {
                prop_assert!(trace.events.is_empty());
                prop_assert_eq!(trace.snapshots.len(), 2);
                prop_assert_eq!(&trace.tree, &before);
            }

            for snapshot in &trace.snapshots {
                if let Err(e) = assert_snapshot_tree(snapshot.tree.as_ref(), false) {
                    return Err(TestCaseError::fail(format!("{}: {e}", snapshot.label)));
                }
            }
            if let Err(e) = assert_snapshot_tree(trace.tree.as_ref(), true) {
                return Err(TestCaseError::fail(e));
            }
            if let Err(e) = avl.assert_valid() {
                return Err(TestCaseError::fail(e));
            }
            prop_assert_eq!(avl.keys(), model.iter().copied().collect::<Vec<_>>());
            prop_assert_eq!(avl.len(), model.len());
        }
    }

    #[test]
    fn rotations_only_on_changing_calls(keys in prop::collection::vec(0i32..1000, 1..100)) {
        let mut avl = AvlEngine::new();
        for k in keys {
            let trace = avl.insert(k);
            let rotations = trace.rotations().count();
            // A single insertion never needs more than one rebalance.
            prop_assert!(rotations <= 1);
            for s in &trace.snapshots {
                prop_assert_eq!(s.rotation_kind.is_some(), s.label.contains("rotation"));
            }
        }
    }
}
