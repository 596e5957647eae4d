//! Height bookkeeping and rotation primitives over the node arena.

pub mod util;

pub use util::{
    assert_avl_tree, balance_factor, for_each_in_order, height, min_value_node, print,
    rotate_left, rotate_right, update_height,
};
