use std::fmt::Debug;

use crate::types::AvlNode;

#[inline]
fn l<K>(arena: &[AvlNode<K>], i: u32) -> Option<u32> {
    arena[i as usize].l
}

#[inline]
fn r<K>(arena: &[AvlNode<K>], i: u32) -> Option<u32> {
    arena[i as usize].r
}

/// Cached height of `node`, `0` for an absent subtree.
#[inline]
pub fn height<K>(arena: &[AvlNode<K>], node: Option<u32>) -> i32 {
    match node {
        Some(i) => arena[i as usize].height,
        None => 0,
    }
}

/// `height(left) - height(right)`, `0` for an absent subtree.
#[inline]
pub fn balance_factor<K>(arena: &[AvlNode<K>], node: Option<u32>) -> i32 {
    match node {
        Some(i) => height(arena, l(arena, i)) - height(arena, r(arena, i)),
        None => 0,
    }
}

/// Recomputes the cached height of `node` from its children.
///
/// Children must already carry correct heights.
#[inline]
pub fn update_height<K>(arena: &mut [AvlNode<K>], node: u32) {
    let lh = height(arena, l(arena, node));
    let rh = height(arena, r(arena, node));
    arena[node as usize].height = 1 + lh.max(rh);
}

/// Right rotation around `y`. Returns the new subtree root (`y`'s former
/// left child); the caller relinks it into `y`'s former parent slot.
///
/// ```text
///       y            x
///      / \          / \
///     x   C  ==>   A   y
///    / \              / \
///   A   B            B   C
/// ```
pub fn rotate_right<K>(arena: &mut [AvlNode<K>], y: u32) -> u32 {
    let x = l(arena, y).expect("rotate_right pivot has a left child");
    let b = r(arena, x);
    arena[y as usize].l = b;
    arena[x as usize].r = Some(y);
    update_height(arena, y);
    update_height(arena, x);
    x
}

/// Left rotation around `x`, the mirror image of [`rotate_right`].
pub fn rotate_left<K>(arena: &mut [AvlNode<K>], x: u32) -> u32 {
    let y = r(arena, x).expect("rotate_left pivot has a right child");
    let b = l(arena, y);
    arena[x as usize].r = b;
    arena[y as usize].l = Some(x);
    update_height(arena, x);
    update_height(arena, y);
    y
}

/// Leftmost node of the subtree rooted at `node`.
pub fn min_value_node<K>(arena: &[AvlNode<K>], node: u32) -> u32 {
    let mut curr = node;
    while let Some(next) = l(arena, curr) {
        curr = next;
    }
    curr
}

/// Visits the subtree rooted at `node` in key order.
pub fn for_each_in_order<K, F>(arena: &[AvlNode<K>], node: Option<u32>, f: &mut F)
where
    F: FnMut(u32, &K),
{
    if let Some(i) = node {
        for_each_in_order(arena, l(arena, i), f);
        f(i, &arena[i as usize].k);
        for_each_in_order(arena, r(arena, i), f);
    }
}

fn tree_height<K>(arena: &[AvlNode<K>], node: Option<u32>) -> i32 {
    match node {
        Some(i) => 1 + tree_height(arena, l(arena, i)).max(tree_height(arena, r(arena, i))),
        None => 0,
    }
}

/// Checks ordering, cached heights and balance of the live tree.
pub fn assert_avl_tree<K: Ord + Debug>(arena: &[AvlNode<K>], root: Option<u32>) -> Result<(), String> {
    fn validate<K: Debug>(arena: &[AvlNode<K>], node: u32) -> Result<(), String> {
        let n = &arena[node as usize];
        if let Some(l) = n.l {
            validate(arena, l)?;
        }
        if let Some(r) = n.r {
            validate(arena, r)?;
        }

        let expected = tree_height(arena, Some(node));
        if n.height != expected {
            return Err(format!(
                "Height mismatch at {:?}: expected {expected}, got {}",
                n.k, n.height
            ));
        }
        let bf = balance_factor(arena, Some(node));
        if !(-1..=1).contains(&bf) {
            return Err(format!("AVL balance violated at {:?}: bf={bf}", n.k));
        }
        Ok(())
    }

    let Some(root) = root else {
        return Ok(());
    };
    validate(arena, root)?;

    let mut prev: Option<&K> = None;
    let mut ordered = true;
    for_each_in_order(arena, Some(root), &mut |i, _| {
        let k = &arena[i as usize].k;
        if let Some(p) = prev {
            if p >= k {
                ordered = false;
            }
        }
        prev = Some(k);
    });
    if !ordered {
        return Err("Node order violated".to_string());
    }

    Ok(())
}

/// Debug printer for the live arena.
pub fn print<K: Debug>(arena: &[AvlNode<K>], node: Option<u32>, tab: &str) -> String {
    match node {
        None => "∅".to_string(),
        Some(i) => {
            let n = &arena[i as usize];
            let left = print(arena, n.l, &format!("{tab}  "));
            let right = print(arena, n.r, &format!("{tab}  "));
            format!(
                "Node[{i}] [h={}, bf={}] {:?}\n{tab}L={left}\n{tab}R={right}",
                n.height,
                balance_factor(arena, Some(i)),
                n.k
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(k: i32) -> AvlNode<i32> {
        AvlNode::new(k)
    }

    /// Left chain 30 <- 20 <- 10 rooted at index 0.
    fn left_chain() -> Vec<AvlNode<i32>> {
        let mut arena = vec![leaf(30), leaf(20), leaf(10)];
        arena[0].l = Some(1);
        arena[1].l = Some(2);
        update_height(&mut arena, 1);
        update_height(&mut arena, 0);
        arena
    }

    #[test]
    fn height_of_absent_is_zero() {
        let arena: Vec<AvlNode<i32>> = Vec::new();
        assert_eq!(height(&arena, None), 0);
        assert_eq!(balance_factor(&arena, None), 0);
    }

    #[test]
    fn heights_and_balance_factor() {
        let arena = left_chain();
        assert_eq!(height(&arena, Some(0)), 3);
        assert_eq!(height(&arena, Some(1)), 2);
        assert_eq!(height(&arena, Some(2)), 1);
        assert_eq!(balance_factor(&arena, Some(0)), 2);
        assert_eq!(balance_factor(&arena, Some(1)), 1);
        assert!(assert_avl_tree(&arena, Some(0)).is_err());
    }

    #[test]
    fn rotate_right_fixes_left_chain() {
        let mut arena = left_chain();
        let root = rotate_right(&mut arena, 0);
        assert_eq!(root, 1);
        assert_eq!(arena[1].l, Some(2));
        assert_eq!(arena[1].r, Some(0));
        assert_eq!(arena[0].l, None);
        assert_eq!(height(&arena, Some(root)), 2);
        assert_eq!(height(&arena, Some(0)), 1);
        assert_avl_tree(&arena, Some(root)).unwrap();
    }

    #[test]
    fn rotate_left_moves_inner_subtree() {
        // 10 -> right 20 (with left 15) -> right 30
        let mut arena = vec![leaf(10), leaf(20), leaf(15), leaf(30)];
        arena[0].r = Some(1);
        arena[1].l = Some(2);
        arena[1].r = Some(3);
        update_height(&mut arena, 1);
        update_height(&mut arena, 0);

        let root = rotate_left(&mut arena, 0);
        assert_eq!(root, 1);
        assert_eq!(arena[1].l, Some(0));
        assert_eq!(arena[0].r, Some(2));
        let mut keys = Vec::new();
        for_each_in_order(&arena, Some(root), &mut |_, k| keys.push(*k));
        assert_eq!(keys, vec![10, 15, 20, 30]);
        assert_eq!(arena[0].height, 2);
        assert_eq!(arena[1].height, 3);
    }

    #[test]
    fn min_value_node_walks_left() {
        let arena = left_chain();
        assert_eq!(min_value_node(&arena, 0), 2);
        assert_eq!(min_value_node(&arena, 2), 2);
    }

    #[test]
    fn print_marks_absent_children() {
        let arena = vec![leaf(1)];
        let out = print(&arena, Some(0), "");
        assert!(out.starts_with("Node[0] [h=1, bf=0] 1"));
        assert!(out.contains("L=∅"));
    }
}
