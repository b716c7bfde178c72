/// Session domain type
use crate::types::Track;
use serde::{Deserialize, Serialize};

/// Named, ordered group of tracks
///
/// Equality is structural over the title and the full track list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session title
    pub title: String,

    /// Member tracks in playback order
    pub tracks: Vec<Track>,
}

impl Session {
    /// Create a session from a title and tracks
    pub fn new(title: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            title: title.into(),
            tracks,
        }
    }

    /// Number of member tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the session has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether a structurally equal track is a member
    pub fn contains(&self, track: &Track) -> bool {
        self.tracks.contains(track)
    }
}
