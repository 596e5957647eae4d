//! Detached tree copies and the recorder that turns an event stream into a
//! replayable snapshot sequence.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::print::{print_tree, PrintChild};
use crate::types::{AvlNode, Event, RotationKind};

/// Deep copy of one subtree.
///
/// Serializes as `{ key, height, bf, left?, right? }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot<K> {
    pub key: K,
    pub height: i32,
    pub bf: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeSnapshot<K>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeSnapshot<K>>>,
}

impl<K> TreeSnapshot<K> {
    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.size()) + self.right.as_ref().map_or(0, |n| n.size())
    }

    pub fn left_key(&self) -> Option<&K> {
        self.left.as_ref().map(|n| &n.key)
    }

    pub fn right_key(&self) -> Option<&K> {
        self.right.as_ref().map(|n| &n.key)
    }

    /// Keys in order.
    pub fn keys(&self) -> Vec<&K> {
        let mut out = Vec::with_capacity(self.size());
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys<'a>(&'a self, out: &mut Vec<&'a K>) {
        if let Some(l) = &self.left {
            l.collect_keys(out);
        }
        out.push(&self.key);
        if let Some(r) = &self.right {
            r.collect_keys(out);
        }
    }

    pub fn find(&self, key: &K) -> Option<&TreeSnapshot<K>>
    where
        K: Ord,
    {
        let mut curr = Some(self);
        while let Some(n) = curr {
            curr = match key.cmp(&n.key) {
                std::cmp::Ordering::Less => n.left.as_deref(),
                std::cmp::Ordering::Greater => n.right.as_deref(),
                std::cmp::Ordering::Equal => return Some(n),
            };
        }
        None
    }
}

impl<K: fmt::Display> TreeSnapshot<K> {
    /// Text dump of the subtree; a missing child next to a present one is
    /// drawn as `∅` so left and right stay distinguishable.
    pub fn print(&self, tab: &str) -> String {
        let head = format!("{} [h={}, bf={}]", self.key, self.height, self.bf);
        if self.left.is_none() && self.right.is_none() {
            return head;
        }
        let left: &PrintChild = &|tab: &str| match &self.left {
            Some(n) => n.print(tab),
            None => "∅".to_string(),
        };
        let right: &PrintChild = &|tab: &str| match &self.right {
            Some(n) => n.print(tab),
            None => "∅".to_string(),
        };
        head + &print_tree(Some(tab), &[Some(left), Some(right)])
    }
}

impl<K: fmt::Display> fmt::Display for TreeSnapshot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print(""))
    }
}

/// Clones the subtree rooted at `node` out of the arena.
///
/// Heights and balance factors are derived from the copied shape rather than
/// the cached field, so a copy taken mid-unwind (before ancestors have had
/// their heights refreshed) still describes the tree it depicts.
pub fn clone_tree<K: Clone>(arena: &[AvlNode<K>], node: Option<u32>) -> Option<TreeSnapshot<K>> {
    let i = node?;
    let n = &arena[i as usize];
    let left = clone_tree(arena, n.l).map(Box::new);
    let right = clone_tree(arena, n.r).map(Box::new);
    let lh = left.as_ref().map_or(0, |c| c.height);
    let rh = right.as_ref().map_or(0, |c| c.height);
    Some(TreeSnapshot {
        key: n.k.clone(),
        height: 1 + lh.max(rh),
        bf: lh - rh,
        left,
        right,
    })
}

/// Checks strict key order, height bookkeeping and, if `balanced`, the AVL
/// bound on every node of a snapshot tree.
pub fn assert_snapshot_tree<K: Ord + fmt::Debug>(
    tree: Option<&TreeSnapshot<K>>,
    balanced: bool,
) -> Result<(), String> {
    fn validate<'a, K: Ord + fmt::Debug>(
        n: &'a TreeSnapshot<K>,
        lo: Option<&'a K>,
        hi: Option<&'a K>,
        balanced: bool,
    ) -> Result<i32, String> {
        if lo.is_some_and(|lo| &n.key <= lo) || hi.is_some_and(|hi| &n.key >= hi) {
            return Err(format!("Node order violated at {:?}", n.key));
        }
        let lh = match &n.left {
            Some(l) => validate(l, lo, Some(&n.key), balanced)?,
            None => 0,
        };
        let rh = match &n.right {
            Some(r) => validate(r, Some(&n.key), hi, balanced)?,
            None => 0,
        };
        if n.height != 1 + lh.max(rh) {
            return Err(format!(
                "Height mismatch at {:?}: expected {}, got {}",
                n.key,
                1 + lh.max(rh),
                n.height
            ));
        }
        if n.bf != lh - rh {
            return Err(format!(
                "Balance factor mismatch at {:?}: expected {}, got {}",
                n.key,
                lh - rh,
                n.bf
            ));
        }
        if balanced && !(-1..=1).contains(&n.bf) {
            return Err(format!("AVL balance violated at {:?}: bf={}", n.key, n.bf));
        }
        Ok(n.height)
    }

    match tree {
        Some(root) => validate(root, None, None, balanced).map(|_| ()),
        None => Ok(()),
    }
}

/// One frame of a mutation trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<K> {
    pub label: String,
    pub tree: Option<TreeSnapshot<K>>,
    pub highlight: Option<K>,
    pub rotation_kind: Option<RotationKind>,
}

impl<K: fmt::Display> fmt::Display for Snapshot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)?;
        if let Some(h) = &self.highlight {
            write!(f, " (highlight {h})")?;
        }
        match &self.tree {
            Some(tree) => write!(f, "\n{tree}"),
            None => f.write_str("\n∅"),
        }
    }
}

/// Result of one `insert` or `remove` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace<K> {
    /// Tree after the mutation.
    pub tree: Option<TreeSnapshot<K>>,
    /// Always at least two frames: the "before" state and one or more after.
    pub snapshots: Vec<Snapshot<K>>,
    /// Structural events in the order they happened.
    pub events: Vec<Event<K>>,
}

impl<K> Trace<K> {
    pub fn rotations(&self) -> impl Iterator<Item = (RotationKind, &K)> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::Rotation { kind, pivot } => Some((*kind, pivot)),
            _ => None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Insert,
    Delete,
}

impl Op {
    fn verb(self) -> &'static str {
        match self {
            Op::Insert => "insert",
            Op::Delete => "delete",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Op::Insert => "Inserted",
            Op::Delete => "Deleted",
        }
    }
}

/// Collects events during one mutation and captures a snapshot for each.
///
/// Events are queued by [`Recorder::push`] and turned into frames by
/// [`Recorder::capture`], which the algorithms call once the arena is
/// consistent again (every slot relinked, no key present twice).
pub(crate) struct Recorder<K> {
    op: Op,
    key: K,
    pending: Vec<Event<K>>,
    events: Vec<Event<K>>,
    snapshots: Vec<Snapshot<K>>,
}

impl<K: Clone + fmt::Display> Recorder<K> {
    pub fn begin(op: Op, key: K, arena: &[AvlNode<K>], root: Option<u32>) -> Self {
        let before = Snapshot {
            label: format!("Before {} {key}", op.verb()),
            tree: clone_tree(arena, root),
            highlight: None,
            rotation_kind: None,
        };
        Self {
            op,
            key,
            pending: Vec::new(),
            events: Vec::new(),
            snapshots: vec![before],
        }
    }

    pub fn push(&mut self, event: Event<K>) {
        debug!(event = %event, "avl event");
        self.pending.push(event);
    }

    pub fn capture(&mut self, arena: &[AvlNode<K>], root: Option<u32>) {
        for event in self.pending.drain(..) {
            trace!(frame = self.snapshots.len(), label = %event, "capture snapshot");
            self.snapshots.push(Snapshot {
                label: event.to_string(),
                tree: clone_tree(arena, root),
                highlight: event.highlight().cloned(),
                rotation_kind: event.rotation_kind(),
            });
            self.events.push(event);
        }
    }

    pub fn finish(mut self, arena: &[AvlNode<K>], root: Option<u32>) -> Trace<K> {
        self.capture(arena, root);
        let tree = clone_tree(arena, root);
        if self.events.is_empty() {
            debug!(op = self.op.verb(), key = %self.key, "no-op mutation");
            self.snapshots.push(Snapshot {
                label: format!("{} {}", self.op.done(), self.key),
                tree: tree.clone(),
                highlight: match self.op {
                    Op::Insert => Some(self.key.clone()),
                    Op::Delete => None,
                },
                rotation_kind: None,
            });
        }
        Trace {
            tree,
            snapshots: self.snapshots,
            events: self.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeSnapshot<i32> {
        let leaf = |key| TreeSnapshot {
            key,
            height: 1,
            bf: 0,
            left: None,
            right: None,
        };
        TreeSnapshot {
            key: 20,
            height: 2,
            bf: 0,
            left: Some(Box::new(leaf(10))),
            right: Some(Box::new(leaf(30))),
        }
    }

    #[test]
    fn keys_find_size() {
        let t = sample();
        assert_eq!(t.keys(), vec![&10, &20, &30]);
        assert_eq!(t.size(), 3);
        assert_eq!(t.find(&30).map(|n| n.height), Some(1));
        assert!(t.find(&25).is_none());
        assert_eq!(t.left_key(), Some(&10));
        assert_eq!(t.right_key(), Some(&30));
    }

    #[test]
    fn validates_sample() {
        assert_snapshot_tree(Some(&sample()), true).unwrap();
        assert_snapshot_tree::<i32>(None, true).unwrap();
    }

    #[test]
    fn rejects_order_violation_deep_in_tree() {
        let mut t = sample();
        // 25 under 10 is locally fine but violates the root bound.
        t.left.as_mut().unwrap().right = Some(Box::new(TreeSnapshot {
            key: 25,
            height: 1,
            bf: 0,
            left: None,
            right: None,
        }));
        t.left.as_mut().unwrap().height = 2;
        t.left.as_mut().unwrap().bf = -1;
        t.height = 3;
        t.bf = 1;
        let err = assert_snapshot_tree(Some(&t), true).unwrap_err();
        assert!(err.contains("order"), "{err}");
    }

    #[test]
    fn rejects_stale_height() {
        let mut t = sample();
        t.height = 5;
        assert!(assert_snapshot_tree(Some(&t), false).is_err());
    }

    #[test]
    fn print_shows_missing_side() {
        let mut t = sample();
        t.left = None;
        t.height = 2;
        t.bf = -1;
        assert_eq!(t.print(""), "20 [h=2, bf=-1]\n├─ ∅\n└─ 30 [h=1, bf=0]");
    }

    #[test]
    fn clone_tree_derives_heights_from_shape() {
        let mut arena = vec![AvlNode::new(3), AvlNode::new(2), AvlNode::new(1)];
        arena[0].l = Some(1);
        arena[1].l = Some(2);
        // Stale cached heights, as seen mid-unwind.
        let tree = clone_tree(&arena, Some(0)).unwrap();
        assert_eq!(tree.height, 3);
        assert_eq!(tree.bf, 2);
        assert_snapshot_tree(Some(&tree), false).unwrap();
        assert!(assert_snapshot_tree(Some(&tree), true).is_err());
    }
}
