use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use tracing::debug;

use crate::avl::util::{
    balance_factor, for_each_in_order, min_value_node, rotate_left, rotate_right, update_height,
};
use crate::snapshot::{clone_tree, Op, Recorder, Snapshot, Trace, TreeSnapshot};
use crate::types::{AvlNode, Event, RotationKind};

/// Link that owns a subtree: the root slot or one child slot of a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Root,
    Left(u32),
    Right(u32),
}

/// AVL tree that records a snapshot trace for every mutation.
///
/// The live tree is owned exclusively by the engine; every tree handed out is
/// a detached [`TreeSnapshot`] copy.
#[derive(Clone, Debug)]
pub struct AvlEngine<K> {
    arena: Vec<AvlNode<K>>,
    free: Vec<u32>,
    root: Option<u32>,
    len: usize,
}

impl<K> Default for AvlEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> AvlEngine<K> {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Discards the live tree. Produces no snapshots.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn root_index(&self) -> Option<u32> {
        self.root
    }

    pub fn arena(&self) -> &[AvlNode<K>] {
        &self.arena
    }

    fn get(&self, slot: Slot) -> Option<u32> {
        match slot {
            Slot::Root => self.root,
            Slot::Left(p) => self.arena[p as usize].l,
            Slot::Right(p) => self.arena[p as usize].r,
        }
    }

    fn link(&mut self, slot: Slot, node: Option<u32>) {
        match slot {
            Slot::Root => self.root = node,
            Slot::Left(p) => self.arena[p as usize].l = node,
            Slot::Right(p) => self.arena[p as usize].r = node,
        }
    }

    fn alloc(&mut self, key: K) -> u32 {
        self.len += 1;
        match self.free.pop() {
            Some(i) => {
                self.arena[i as usize] = AvlNode::new(key);
                i
            }
            None => {
                self.arena.push(AvlNode::new(key));
                (self.arena.len() - 1) as u32
            }
        }
    }

    fn release(&mut self, i: u32) {
        self.len -= 1;
        let n = &mut self.arena[i as usize];
        n.l = None;
        n.r = None;
        self.free.push(i);
    }

    /// Applies `kind` to the subtree rooted at `n` and returns its new root.
    fn rotate(&mut self, n: u32, kind: RotationKind) -> u32 {
        match kind {
            RotationKind::LL => rotate_right(&mut self.arena, n),
            RotationKind::RR => rotate_left(&mut self.arena, n),
            RotationKind::LR => {
                let l = self.arena[n as usize].l.expect("LR pivot has a left child");
                let l = rotate_left(&mut self.arena, l);
                self.arena[n as usize].l = Some(l);
                rotate_right(&mut self.arena, n)
            }
            RotationKind::RL => {
                let r = self.arena[n as usize].r.expect("RL pivot has a right child");
                let r = rotate_right(&mut self.arena, r);
                self.arena[n as usize].r = Some(r);
                rotate_left(&mut self.arena, n)
            }
        }
    }

    fn child_key(&self, child: Option<u32>) -> &K {
        let c = child.expect("heavy side has a child");
        &self.arena[c as usize].k
    }
}

impl<K> AvlEngine<K>
where
    K: Ord + Clone + Display,
{
    /// Inserts `key`, returning the final tree and the snapshot trace.
    ///
    /// Inserting a key that is already present leaves the tree untouched and
    /// yields exactly two snapshots.
    pub fn insert(&mut self, key: K) -> Trace<K> {
        let mut rec = Recorder::begin(Op::Insert, key.clone(), &self.arena, self.root);
        self.insert_at(Slot::Root, &key, &mut rec);
        rec.finish(&self.arena, self.root)
    }

    /// Removes `key`, returning the final tree and the snapshot trace.
    ///
    /// Removing an absent key is a no-op that yields exactly two snapshots.
    pub fn remove(&mut self, key: K) -> Trace<K> {
        let mut rec = Recorder::begin(Op::Delete, key.clone(), &self.arena, self.root);
        self.remove_at(Slot::Root, &key, &mut rec);
        rec.finish(&self.arena, self.root)
    }

    /// Detached copy of the current tree.
    pub fn tree(&self) -> Option<TreeSnapshot<K>> {
        clone_tree(&self.arena, self.root)
    }

    /// Clears the engine, inserts `keys` in order and concatenates every
    /// insert's snapshots into one sequence.
    pub fn visualize<I>(&mut self, keys: I) -> Vec<Snapshot<K>>
    where
        I: IntoIterator<Item = K>,
    {
        self.clear();
        let mut out = Vec::new();
        for key in keys {
            out.extend(self.insert(key).snapshots);
        }
        debug!(frames = out.len(), nodes = self.len, "bulk visualize");
        out
    }

    pub fn contains(&self, key: &K) -> bool {
        let mut curr = self.root;
        while let Some(i) = curr {
            let n = &self.arena[i as usize];
            curr = match key.cmp(&n.k) {
                Ordering::Less => n.l,
                Ordering::Greater => n.r,
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.len);
        for_each_in_order(&self.arena, self.root, &mut |_, k| out.push(k.clone()));
        out
    }

    fn insert_at(&mut self, slot: Slot, key: &K, rec: &mut Recorder<K>) {
        let Some(n) = self.get(slot) else {
            let n = self.alloc(key.clone());
            self.link(slot, Some(n));
            rec.push(Event::NodeInserted { key: key.clone() });
            rec.capture(&self.arena, self.root);
            return;
        };

        match key.cmp(&self.arena[n as usize].k) {
            Ordering::Less => self.insert_at(Slot::Left(n), key, rec),
            Ordering::Greater => self.insert_at(Slot::Right(n), key, rec),
            Ordering::Equal => return,
        }

        update_height(&mut self.arena, n);
        let bf = balance_factor(&self.arena, Some(n));

        // Only the insertion path can be out of balance, so comparing the new
        // key with the heavy child's key is enough to tell LL/LR and RR/RL.
        let kind = if bf > 1 {
            let l = self.arena[n as usize].l;
            match key.cmp(self.child_key(l)) {
                Ordering::Less => Some(RotationKind::LL),
                Ordering::Greater => Some(RotationKind::LR),
                Ordering::Equal => None,
            }
        } else if bf < -1 {
            let r = self.arena[n as usize].r;
            match key.cmp(self.child_key(r)) {
                Ordering::Greater => Some(RotationKind::RR),
                Ordering::Less => Some(RotationKind::RL),
                Ordering::Equal => None,
            }
        } else {
            None
        };

        if let Some(kind) = kind {
            self.rebalance(slot, n, kind, rec);
        }
    }

    fn remove_at(&mut self, slot: Slot, key: &K, rec: &mut Recorder<K>) {
        let Some(n) = self.get(slot) else {
            return;
        };

        match key.cmp(&self.arena[n as usize].k) {
            Ordering::Less => self.remove_at(Slot::Left(n), key, rec),
            Ordering::Greater => self.remove_at(Slot::Right(n), key, rec),
            Ordering::Equal => {
                rec.push(Event::NodeDeleted {
                    key: self.arena[n as usize].k.clone(),
                });
                let (l, r) = (self.arena[n as usize].l, self.arena[n as usize].r);
                match (l, r) {
                    (Some(_), Some(r)) => {
                        // Successor moves up; its old node is removed below and
                        // both deletion frames are captured once it is gone.
                        let s = min_value_node(&self.arena, r);
                        let succ = self.arena[s as usize].k.clone();
                        self.arena[n as usize].k = succ.clone();
                        self.remove_at(Slot::Right(n), &succ, rec);
                    }
                    (l, r) => {
                        self.link(slot, l.or(r));
                        self.release(n);
                        rec.capture(&self.arena, self.root);
                        return;
                    }
                }
            }
        }

        update_height(&mut self.arena, n);
        let bf = balance_factor(&self.arena, Some(n));

        // Deletion can unbalance either side regardless of where the key was,
        // so the heavy child's own balance factor picks the rotation.
        let kind = if bf > 1 {
            if balance_factor(&self.arena, self.arena[n as usize].l) >= 0 {
                Some(RotationKind::LL)
            } else {
                Some(RotationKind::LR)
            }
        } else if bf < -1 {
            if balance_factor(&self.arena, self.arena[n as usize].r) <= 0 {
                Some(RotationKind::RR)
            } else {
                Some(RotationKind::RL)
            }
        } else {
            None
        };

        if let Some(kind) = kind {
            self.rebalance(slot, n, kind, rec);
        }
    }

    fn rebalance(&mut self, slot: Slot, n: u32, kind: RotationKind, rec: &mut Recorder<K>) {
        let pivot = self.arena[n as usize].k.clone();
        let top = self.rotate(n, kind);
        self.link(slot, Some(top));
        rec.push(Event::Rotation { kind, pivot });
        rec.capture(&self.arena, self.root);
    }
}

impl<K> AvlEngine<K>
where
    K: Ord + Debug,
{
    /// Validates ordering, cached heights and balance of the live tree.
    pub fn assert_valid(&self) -> Result<(), String> {
        crate::avl::util::assert_avl_tree(&self.arena, self.root)
    }

    /// Debug dump of the live arena, including node indices.
    pub fn print(&self) -> String {
        crate::avl::util::print(&self.arena, self.root, "")
    }
}
