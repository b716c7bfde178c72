//! Playback Events
//!
//! Queued by the controller for UI synchronization. Consumers collect them
//! with `PlaybackController::drain_events`.

use crate::types::PlaybackState;
use rhythmic_core::types::{Index, Position};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A track began playing
    TrackStarted {
        /// Queue position of the track
        position: Position,
        /// Track store index
        index: Index,
        title: String,
    },

    /// A track ended, naturally or by skipping
    TrackFinished {
        index: Index,
        /// `false` when skipped
        successfully: bool,
    },

    /// A track could not be played and was dropped from the queue
    TrackFailed { index: Index, message: String },

    /// Every queued track failed; playback stopped
    QueueExhausted,

    /// The platform interrupted audio output
    InterruptionBegan,

    /// The interruption ended
    InterruptionEnded {
        /// Whether playback was resumed
        resumed: bool,
    },
}
