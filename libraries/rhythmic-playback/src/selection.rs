//! User-curated selection of track indices
//!
//! The selection is what the listener has picked for the next playback.
//! Playback itself never reads it directly: a [`QueueCursor`] snapshot is
//! taken when playback starts.
//!
//! [`QueueCursor`]: crate::QueueCursor

use rhythmic_core::types::Index;
use std::fmt;

/// Callback fired after every mutating call with the new selection
pub type SelectionObserver = Box<dyn Fn(&[Index]) + Send + Sync>;

/// Ordered, duplicate-tolerant list of selected track indices
///
/// Every mutating call marks the selection as changed since playback and
/// notifies observers exactly once, even when the call changed nothing.
#[derive(Default)]
pub struct SelectionQueue {
    /// Selected indices in selection order
    selected: Vec<Index>,

    /// Resume point of the inspection sequence
    inspect_from: usize,

    /// Set by every mutation, cleared when a playback snapshot is taken
    changed_since_playback: bool,

    observers: Vec<SelectionObserver>,
}

impl SelectionQueue {
    /// Create new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mutation observer
    pub fn subscribe(&mut self, observer: impl Fn(&[Index]) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn append(&mut self, index: Index) {
        self.selected.push(index);
        self.changed();
    }

    pub fn append_all(&mut self, indices: impl IntoIterator<Item = Index>) {
        self.selected.extend(indices);
        self.changed();
    }

    /// Remove the first occurrence of `index`
    ///
    /// A missing value still counts as a mutation.
    pub fn remove(&mut self, index: Index) -> Option<Index> {
        let removed = self
            .selected
            .iter()
            .position(|&i| i == index)
            .map(|position| self.selected.remove(position));
        self.changed();
        removed
    }

    /// Clear the selection and restart inspection
    pub fn reset(&mut self) {
        self.selected.clear();
        self.inspect_from = 0;
        self.changed();
    }

    /// Toggle `index`: deselect if present, select otherwise
    ///
    /// Returns whether `index` is selected afterwards.
    pub fn cell_selected(&mut self, index: Index) -> bool {
        let selected = match self.selected.iter().position(|&i| i == index) {
            Some(position) => {
                self.selected.remove(position);
                false
            }
            None => {
                self.selected.push(index);
                true
            }
        };
        self.changed();
        selected
    }

    /// Select `index` unless it already is; never deselects
    pub fn safe_select_cell(&mut self, index: Index) {
        if !self.selected.contains(&index) {
            self.selected.push(index);
        }
        self.changed();
    }

    /// Drop every occurrence of a track removed from the store and shift
    /// later indices down to match
    pub fn track_removed(&mut self, index: Index) {
        self.selected.retain(|&i| i != index);
        for selected in &mut self.selected {
            if *selected > index {
                *selected -= 1;
            }
        }
        self.inspect_from = self.inspect_from.min(self.selected.len());
        self.changed();
    }

    pub fn contains(&self, index: Index) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected(&self) -> &[Index] {
        &self.selected
    }

    /// Snapshot for starting playback; `None` when nothing is selected
    pub fn queued(&self) -> Option<&[Index]> {
        if self.selected.is_empty() {
            None
        } else {
            Some(&self.selected)
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn changed_since_playback(&self) -> bool {
        self.changed_since_playback
    }

    /// Record that playback now reflects the selection
    pub fn mark_synced(&mut self) {
        self.changed_since_playback = false;
    }

    /// One-shot inspection of the selection
    ///
    /// Yields from where the previous inspection stopped up to, but not
    /// including, the last element. Only [`SelectionQueue::reset`] rewinds
    /// it.
    pub fn inspect(&mut self) -> Inspect<'_> {
        Inspect {
            selected: &self.selected,
            cursor: &mut self.inspect_from,
        }
    }

    fn changed(&mut self) {
        self.changed_since_playback = true;
        for observer in &self.observers {
            observer(&self.selected);
        }
    }
}

impl fmt::Debug for SelectionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionQueue")
            .field("selected", &self.selected)
            .field("inspect_from", &self.inspect_from)
            .field("changed_since_playback", &self.changed_since_playback)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Forward-only iterator returned by [`SelectionQueue::inspect`]
#[derive(Debug)]
pub struct Inspect<'a> {
    selected: &'a [Index],
    cursor: &'a mut usize,
}

impl Iterator for Inspect<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Index> {
        if *self.cursor + 1 >= self.selected.len() {
            return None;
        }
        let index = self.selected[*self.cursor];
        *self.cursor += 1;
        Some(index)
    }
}
