//! Circular navigation over a frozen queue snapshot

use crate::error::{PlaybackError, Result};
use crate::selection::SelectionQueue;
use rhythmic_core::types::{Index, Position};

/// Current offset into a non-empty list of track indices
///
/// Built once per playback from a copy of the selection, so later
/// selection changes never reach an in-flight cursor. Navigation wraps in
/// both directions and never runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueCursor {
    queued: Vec<Index>,
    position: Position,
}

impl QueueCursor {
    /// Create a cursor at offset 0
    ///
    /// # Errors
    /// Returns `QueueEmpty` for an empty snapshot
    pub fn new(queued: Vec<Index>) -> Result<Self> {
        if queued.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        Ok(Self {
            queued,
            position: 0,
        })
    }

    /// Snapshot the current selection
    pub fn from_selection(selection: &SelectionQueue) -> Result<Self> {
        let queued = selection.queued().ok_or(PlaybackError::QueueEmpty)?;
        Self::new(queued.to_vec())
    }

    /// Index at the current position
    pub fn current(&self) -> Index {
        self.queued[self.position]
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn queued(&self) -> &[Index] {
        &self.queued
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    /// Always `false`: a cursor cannot be built or left empty
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    fn last_offset(&self) -> Position {
        self.queued.len() - 1
    }

    /// Advance, wrapping past the end to offset 0
    pub fn next(&mut self) -> Index {
        self.position = if self.position < self.last_offset() {
            self.position + 1
        } else {
            0
        };
        self.current()
    }

    /// Step back, wrapping before offset 0 to the end
    pub fn previous(&mut self) -> Index {
        self.position = if self.position == 0 {
            self.last_offset()
        } else {
            self.position - 1
        };
        self.current()
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Jump to `position`; `false` and no change when out of range
    pub fn set_position(&mut self, position: Position) -> bool {
        if position >= self.queued.len() {
            return false;
        }
        self.position = position;
        true
    }

    /// Offset of the first occurrence of `value`
    ///
    /// # Panics
    /// Panics if `value` is not in the queue. Callers must only pass values
    /// drawn from this cursor.
    pub fn position_of(&self, value: Index) -> Position {
        match self.queued.iter().position(|&i| i == value) {
            Some(position) => position,
            None => panic!("index {value} is not part of this queue"),
        }
    }

    /// Offset following the one holding `value`, with wraparound
    ///
    /// # Panics
    /// Panics if `value` is not in the queue
    pub fn position_after(&self, value: Index) -> Position {
        let position = self.position_of(value);
        if position < self.last_offset() {
            position + 1
        } else {
            0
        }
    }

    /// Offset preceding the one holding `value`, with wraparound
    ///
    /// # Panics
    /// Panics if `value` is not in the queue
    pub fn position_before(&self, value: Index) -> Position {
        let position = self.position_of(value);
        if position == 0 {
            self.last_offset()
        } else {
            position - 1
        }
    }

    /// Drop the entry at the current position
    ///
    /// The following entry takes its place, wrapping to offset 0 when the
    /// last entry was removed. Returns `None` without removing anything when
    /// it is the only entry.
    pub fn remove_current(&mut self) -> Option<Index> {
        if self.queued.len() == 1 {
            return None;
        }
        let removed = self.queued.remove(self.position);
        if self.position >= self.queued.len() {
            self.position = 0;
        }
        Some(removed)
    }
}
