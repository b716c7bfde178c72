/// Track domain type
use crate::error::{Result, RhythmicError};
use crate::types::{RateKind, RhythmKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Category given to tracks that do not specify one
pub const DEFAULT_CATEGORY: &str = "song";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Playable asset
///
/// Equality only looks at `title`, `period`, `category` and `file`. Two
/// tracks that differ only in rhythm or rate are interchangeable for
/// lookup and removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub title: String,

    /// Seconds per rhythm cycle before the rate is applied
    pub period: f64,

    /// Free-form grouping label
    #[serde(default = "default_category")]
    pub category: String,

    /// Audio file backing this track
    pub file: PathBuf,

    /// Rhythm applied while playing
    #[serde(default)]
    pub rhythm: RhythmKind,

    /// Period scaling
    #[serde(default)]
    pub rate: RateKind,
}

impl Track {
    /// Create a track with the default category, rhythm and rate
    pub fn new(title: impl Into<String>, period: f64, file: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            period,
            category: default_category(),
            file: file.into(),
            rhythm: RhythmKind::default(),
            rate: RateKind::default(),
        }
    }

    /// Create a track from a tempo in beats per minute
    ///
    /// # Errors
    /// Returns `InvalidInput` if `bpm` is not a positive finite number, or
    /// if it is so small that the period overflows
    pub fn from_bpm(title: impl Into<String>, bpm: f64, file: impl Into<PathBuf>) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(RhythmicError::invalid_input(format!(
                "tempo must be positive, got {bpm}"
            )));
        }
        let track = Self::new(title, 60.0 / bpm, file);
        track.validate()?;
        Ok(track)
    }

    /// Create a track for an imported file, titled after its file stem
    pub fn from_file(file: impl AsRef<Path>, bpm: f64) -> Result<Self> {
        let file = file.as_ref();
        let title = file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                RhythmicError::invalid_input(format!("no usable file name in {}", file.display()))
            })?;
        Self::from_bpm(title, bpm, file)
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the rhythm
    pub fn with_rhythm(mut self, rhythm: RhythmKind) -> Self {
        self.rhythm = rhythm;
        self
    }

    /// Set the rate
    pub fn with_rate(mut self, rate: RateKind) -> Self {
        self.rate = rate;
        self
    }

    /// Check that the period can be stored and played
    ///
    /// JSON has no representation for infinity or NaN, so a track that
    /// fails this check would not survive a save and reload.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless the period is positive and finite
    pub fn validate(&self) -> Result<()> {
        if self.period.is_finite() && self.period > 0.0 {
            return Ok(());
        }
        Err(RhythmicError::invalid_input(format!(
            "period of {} must be positive and finite, got {}",
            self.title, self.period
        )))
    }

    /// Period after the rate transform
    pub fn effective_period(&self) -> f64 {
        self.rate.apply(self.period)
    }

    /// Effective period as a tick interval
    ///
    /// # Errors
    /// Returns `InvalidInput` if the period is not positive and finite
    pub fn effective_interval(&self) -> Result<Duration> {
        let period = self.effective_period();
        if period <= 0.0 {
            return Err(RhythmicError::invalid_input(format!(
                "period must be positive, got {period}"
            )));
        }
        Duration::try_from_secs_f64(period)
            .map_err(|e| RhythmicError::invalid_input(format!("period {period}: {e}")))
    }

    /// One-line summary: rhythm, rate and effective period
    pub fn detail(&self) -> String {
        format!("{} : {} : {:.3}", self.rhythm, self.rate, self.effective_period())
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.period == other.period
            && self.category == other.category
            && self.file == other.file
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
