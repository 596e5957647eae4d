//! AVL tree engine with a replayable trace of every structural change.
//!
//! Each `insert`/`remove` runs the classic recursive AVL algorithm to
//! completion and returns a [`Trace`]: the final tree plus an ordered list of
//! detached [`Snapshot`]s (the "before" state, one frame per event, and a
//! terminal frame for no-op calls) suitable for step-by-step animation.
//!
//! Nodes live in an arena; child links are `Option<u32>` indices into it.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! [`types`] | [`AvlNode`], [`RotationKind`], [`Event`] |
//! [`avl`] | height helpers, `rotate_left` / `rotate_right`, validation |
//! [`engine`] | [`AvlEngine`] with the recursive insert/delete |
//! [`snapshot`] | [`TreeSnapshot`], [`Snapshot`], [`Trace`] |
//! [`playback`] | [`Playback`] step cursor |
//! [`keys`] | [`parse_key`], [`parse_keys`] |
//! [`print`] | box-drawing tree dump |
//!
//! # Example
//!
//! ```
//! use avl_trace::{AvlEngine, RotationKind};
//!
//! let mut avl = AvlEngine::new();
//! avl.insert(10);
//! avl.insert(20);
//! let trace = avl.insert(30);
//!
//! assert_eq!(trace.rotations().collect::<Vec<_>>(), vec![(RotationKind::RR, &10)]);
//! let root = trace.tree.unwrap();
//! assert_eq!((root.key, root.left_key(), root.right_key()), (20, Some(&10), Some(&30)));
//! ```

pub mod avl;
pub mod engine;
pub mod keys;
pub mod playback;
pub mod print;
pub mod snapshot;
pub mod types;

pub use engine::AvlEngine;
pub use keys::{parse_key, parse_keys, KeyError};
pub use playback::Playback;
pub use snapshot::{assert_snapshot_tree, clone_tree, Snapshot, Trace, TreeSnapshot};
pub use types::{AvlNode, Event, RotationKind};
