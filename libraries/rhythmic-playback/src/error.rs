//! Error types for playback management

use rhythmic_core::RhythmicError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Audio transport could not be built or driven
    #[error("Transport error: {0}")]
    Transport(String),

    /// Rhythm period is not usable as a tick interval
    #[error("Invalid rhythm period: {0}")]
    InvalidPeriod(f64),

    /// Timers need a tokio runtime
    #[error("No tokio runtime available")]
    NoRuntime,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Core error
    #[error(transparent)]
    Core(#[from] RhythmicError),
}

impl PlaybackError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether this error means the track itself cannot be played
    ///
    /// Such failures are recovered during playback by dropping the entry
    /// from the queue.
    pub fn is_unplayable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::InvalidPeriod(_) | Self::Core(RhythmicError::Audio(_))
        )
    }
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
