//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// How the Stitch rhythm shapes volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StitchMode {
    /// Sine wave advanced by a fixed step per tick, skipped near its peaks
    #[default]
    Sine,

    /// Hard on/off between full volume and the floor
    Gate,
}

/// Tuning for the rhythm state machines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Magnitude of the hard sides in the Crosspan cycle (default: 0.87)
    pub crosspan_bias: f32,

    /// Pan value of the Crosspan center phase (default: 0.0)
    pub crosspan_center: f32,

    /// Stitch volume shape (default: Sine)
    pub stitch_mode: StitchMode,

    /// Radians added to the Stitch wave per tick (default: PI/16)
    pub stitch_step: f64,

    /// Stitch samples at or above this magnitude are skipped (default: 0.9)
    pub stitch_clamp: f64,

    /// Low volume of the Stitch gate (default: 0.0)
    pub stitch_floor: f32,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            crosspan_bias: 0.87,
            crosspan_center: 0.0,
            stitch_mode: StitchMode::Sine,
            stitch_step: PI / 16.0,
            stitch_clamp: 0.9,
            stitch_floor: 0.0,
        }
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Rewind restarts the track once it has played this long (default: 5s)
    pub rewind_threshold_secs: f64,

    /// Step used by seek-forward/backward helpers (default: 15s)
    pub seek_interval_secs: f64,
}

impl PlaybackConfig {
    pub fn rewind_threshold(&self) -> Duration {
        Duration::try_from_secs_f64(self.rewind_threshold_secs).unwrap_or_default()
    }

    pub fn seek_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.seek_interval_secs).unwrap_or_default()
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rewind_threshold_secs: 5.0,
            seek_interval_secs: 15.0,
        }
    }
}

/// Audio session interruption reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// Another source took over audio output
    Began,

    /// The interruption is over
    Ended {
        /// Whether the platform suggests resuming
        should_resume: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rhythm_config() {
        let config = RhythmConfig::default();
        assert_eq!(config.crosspan_bias, 0.87);
        assert_eq!(config.crosspan_center, 0.0);
        assert_eq!(config.stitch_mode, StitchMode::Sine);
        assert_eq!(config.stitch_step, PI / 16.0);
        assert_eq!(config.stitch_clamp, 0.9);
    }

    #[test]
    fn default_playback_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.rewind_threshold(), Duration::from_secs(5));
        assert_eq!(config.seek_interval(), Duration::from_secs(15));
    }

    #[test]
    fn negative_durations_collapse_to_zero() {
        let config = PlaybackConfig {
            rewind_threshold_secs: -1.0,
            ..PlaybackConfig::default()
        };
        assert_eq!(config.rewind_threshold(), Duration::ZERO);
    }
}
