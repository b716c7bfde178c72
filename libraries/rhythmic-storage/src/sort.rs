//! Sorted views over the track store
//!
//! A view holds only master indices, so it stays valid as long as it is
//! rebuilt after every store mutation.

use rhythmic_core::types::Index;
use rhythmic_core::Track;
use std::fmt;

/// Orderings offered for the track list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackSort {
    /// Master storage order
    #[default]
    DateAdded,

    /// Master storage order, reversed
    DateAddedReversed,

    /// Case-insensitive by title
    Lexicographic,

    /// Shortest period first
    Tempo,
}

impl TrackSort {
    pub const ALL: [TrackSort; 4] = [
        TrackSort::DateAdded,
        TrackSort::DateAddedReversed,
        TrackSort::Lexicographic,
        TrackSort::Tempo,
    ];

    pub fn descriptor(self) -> &'static str {
        match self {
            TrackSort::DateAdded => "Date Added",
            TrackSort::DateAddedReversed => "Date Added (Reversed)",
            TrackSort::Lexicographic => "Title",
            TrackSort::Tempo => "Tempo",
        }
    }

    /// Master indices of `tracks` in this ordering
    ///
    /// Ties keep master order.
    pub fn order(self, tracks: &[Track]) -> Vec<Index> {
        let mut order: Vec<Index> = (0..tracks.len()).collect();
        match self {
            TrackSort::DateAdded => {}
            TrackSort::DateAddedReversed => order.reverse(),
            TrackSort::Lexicographic => {
                order.sort_by_cached_key(|&i| tracks[i].title.to_lowercase());
            }
            TrackSort::Tempo => {
                order.sort_by(|&a, &b| tracks[a].period.total_cmp(&tracks[b].period));
            }
        }
        order
    }
}

impl fmt::Display for TrackSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}

/// Sorted projection of the master track list
#[derive(Debug, Clone, Default)]
pub struct SortedView {
    sort: TrackSort,
    order: Vec<Index>,
}

impl SortedView {
    pub fn new(sort: TrackSort, tracks: &[Track]) -> Self {
        Self {
            sort,
            order: sort.order(tracks),
        }
    }

    pub fn sort(&self) -> TrackSort {
        self.sort
    }

    /// Switch ordering and rebuild
    pub fn set_sort(&mut self, sort: TrackSort, tracks: &[Track]) {
        self.sort = sort;
        self.resort(tracks);
    }

    /// Rebuild after the master list changed
    pub fn resort(&mut self, tracks: &[Track]) {
        self.order = self.sort.order(tracks);
    }

    /// Master index shown at `view_index`
    pub fn master_index(&self, view_index: usize) -> Option<Index> {
        self.order.get(view_index).copied()
    }

    /// View position of a master index
    pub fn view_index(&self, master: Index) -> Option<usize> {
        self.order.iter().position(|&i| i == master)
    }

    /// View position of the first track structurally equal to `track`
    pub fn view_index_of(&self, tracks: &[Track], track: &Track) -> Option<usize> {
        let master = tracks.iter().position(|t| t == track)?;
        self.view_index(master)
    }

    pub fn indices(&self) -> &[Index] {
        &self.order
    }

    /// Tracks in view order
    pub fn tracks<'a>(&'a self, tracks: &'a [Track]) -> impl Iterator<Item = &'a Track> + 'a {
        self.order.iter().filter_map(move |&i| tracks.get(i))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
