//! Step cursor over a snapshot sequence.

use crate::snapshot::Snapshot;

/// Holds a snapshot sequence and the index of the frame being shown.
///
/// Stepping saturates at both ends; jumping outside the sequence is ignored.
#[derive(Clone, Debug)]
pub struct Playback<K> {
    frames: Vec<Snapshot<K>>,
    index: usize,
}

impl<K> Playback<K> {
    pub fn new(frames: Vec<Snapshot<K>>) -> Self {
        Self { frames, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frames(&self) -> &[Snapshot<K>] {
        &self.frames
    }

    pub fn current(&self) -> Option<&Snapshot<K>> {
        self.frames.get(self.index)
    }

    /// Moves to `index` if it is inside the sequence. Returns whether it moved.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.index = index;
        true
    }

    pub fn forward(&mut self) -> Option<&Snapshot<K>> {
        if self.index + 1 < self.frames.len() {
            self.index += 1;
        }
        self.current()
    }

    pub fn back(&mut self) -> Option<&Snapshot<K>> {
        self.index = self.index.saturating_sub(1);
        self.current()
    }

    pub fn first(&mut self) -> Option<&Snapshot<K>> {
        self.index = 0;
        self.current()
    }

    pub fn last(&mut self) -> Option<&Snapshot<K>> {
        self.index = self.frames.len().saturating_sub(1);
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.index + 1 >= self.frames.len()
    }
}

impl<K> From<Vec<Snapshot<K>>> for Playback<K> {
    fn from(frames: Vec<Snapshot<K>>) -> Self {
        Self::new(frames)
    }
}
