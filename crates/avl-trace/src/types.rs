//! Arena node and event definitions.
//!
//! Nodes are stored in a [`Vec`]-backed arena. Each child "pointer" is an
//! `Option<u32>` index into that arena; a node is linked from exactly one
//! parent slot (or from the root slot), so there is no sharing and no
//! back-reference.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One key of the live tree.
#[derive(Clone, Debug)]
pub struct AvlNode<K> {
    pub l: Option<u32>,
    pub r: Option<u32>,
    pub k: K,
    /// Cached height of the subtree rooted here; a leaf is `1`.
    pub height: i32,
}

impl<K> AvlNode<K> {
    pub fn new(k: K) -> Self {
        Self {
            l: None,
            r: None,
            k,
            height: 1,
        }
    }
}

/// The four canonical rebalancing rotations.
///
/// `LL` and `RR` are single rotations (right and left respectively), `LR` and
/// `RL` are double rotations.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationKind {
    LL,
    RR,
    LR,
    RL,
}

impl RotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationKind::LL => "LL",
            RotationKind::RR => "RR",
            RotationKind::LR => "LR",
            RotationKind::RL => "RL",
        }
    }
}

impl fmt::Display for RotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural change observed during a single `insert` or `remove` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event<K> {
    NodeInserted { key: K },
    NodeDeleted { key: K },
    Rotation { kind: RotationKind, pivot: K },
}

impl<K> Event<K> {
    /// Key to emphasize when rendering the frame for this event.
    ///
    /// Plain deletions have no highlight: the key is gone from the picture.
    pub fn highlight(&self) -> Option<&K> {
        match self {
            Event::NodeInserted { key } => Some(key),
            Event::NodeDeleted { .. } => None,
            Event::Rotation { pivot, .. } => Some(pivot),
        }
    }

    pub fn rotation_kind(&self) -> Option<RotationKind> {
        match self {
            Event::Rotation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl<K: fmt::Display> fmt::Display for Event<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::NodeInserted { key } => write!(f, "Inserted {key}"),
            Event::NodeDeleted { key } => write!(f, "Deleted {key}"),
            Event::Rotation { kind, pivot } => write!(f, "{kind} rotation at node {pivot}"),
        }
    }
}
