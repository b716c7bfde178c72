/// Player configuration
use crate::error::{PlaybackError, Result};
use crate::types::{PlaybackConfig, RhythmConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for configuration overrides
///
/// Sections are separated with a double underscore, for example
/// `RHYTHMIC_RHYTHM__CROSSPAN_BIAS=0.75`.
pub const ENV_PREFIX: &str = "RHYTHMIC";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub rhythm: RhythmConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory holding the persisted track and session lists
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl PlayerConfig {
    /// Load configuration from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Some(Path::new("config.toml")), ENV_PREFIX)
    }

    /// Load from an optional file, then apply environment overrides
    ///
    /// A missing file is skipped. The result is validated.
    pub fn load_from(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text without consulting the environment
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let rhythm = &self.rhythm;

        if !(0.0..=1.0).contains(&rhythm.crosspan_bias) {
            return Err(PlaybackError::Config(format!(
                "rhythm.crosspan_bias must be within [0, 1], got {}",
                rhythm.crosspan_bias
            )));
        }

        if !(-1.0..=1.0).contains(&rhythm.crosspan_center) {
            return Err(PlaybackError::Config(format!(
                "rhythm.crosspan_center must be within [-1, 1], got {}",
                rhythm.crosspan_center
            )));
        }

        if !(rhythm.stitch_step.is_finite() && rhythm.stitch_step > 0.0) {
            return Err(PlaybackError::Config(format!(
                "rhythm.stitch_step must be positive, got {}",
                rhythm.stitch_step
            )));
        }

        if !(rhythm.stitch_clamp > 0.0 && rhythm.stitch_clamp <= 1.0) {
            return Err(PlaybackError::Config(format!(
                "rhythm.stitch_clamp must be within (0, 1], got {}",
                rhythm.stitch_clamp
            )));
        }

        if !(0.0..=1.0).contains(&rhythm.stitch_floor) {
            return Err(PlaybackError::Config(format!(
                "rhythm.stitch_floor must be within [0, 1], got {}",
                rhythm.stitch_floor
            )));
        }

        let rewind = self.playback.rewind_threshold_secs;
        if rewind.is_nan() || rewind < 0.0 {
            return Err(PlaybackError::Config(
                "playback.rewind_threshold_secs must not be negative".to_string(),
            ));
        }

        let seek = self.playback.seek_interval_secs;
        if seek.is_nan() || seek <= 0.0 {
            return Err(PlaybackError::Config(
                "playback.seek_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
