/// Rhythm and rate kinds
use serde::{Deserialize, Serialize};
use std::fmt;

/// Periodic transformation applied to a playing track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhythmKind {
    /// Pan alternates between hard left and hard right
    #[default]
    Bilateral,

    /// Pan sweeps left, center, right, center
    Crosspan,

    /// Pan is held at center
    Synthesis,

    /// Volume pulses on a fixed step
    Stitch,
}

impl RhythmKind {
    /// All kinds in display order
    pub const ALL: [RhythmKind; 4] = [
        RhythmKind::Bilateral,
        RhythmKind::Crosspan,
        RhythmKind::Synthesis,
        RhythmKind::Stitch,
    ];

    /// Label shown to listeners
    pub fn descriptor(self) -> &'static str {
        match self {
            RhythmKind::Bilateral => "Bilateral",
            RhythmKind::Crosspan => "Crosspan",
            RhythmKind::Synthesis => "Synthesis",
            RhythmKind::Stitch => "Swave",
        }
    }

    /// Whether this kind drives volume rather than pan
    pub fn drives_volume(self) -> bool {
        matches!(self, RhythmKind::Stitch)
    }
}

impl fmt::Display for RhythmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}

/// Period scaling applied on top of a track's base period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    /// Twice the base period
    Half,

    /// Base period unchanged
    #[default]
    Normal,

    /// Half the base period
    Double,

    /// A quarter of the base period
    Quad,
}

impl RateKind {
    /// All kinds in display order
    pub const ALL: [RateKind; 4] = [
        RateKind::Half,
        RateKind::Normal,
        RateKind::Double,
        RateKind::Quad,
    ];

    /// Scale `period` by this rate
    pub fn apply(self, period: f64) -> f64 {
        match self {
            RateKind::Half => period * 2.0,
            RateKind::Normal => period,
            RateKind::Double => period / 2.0,
            RateKind::Quad => period / 4.0,
        }
    }

    /// Label shown to listeners
    pub fn descriptor(self) -> &'static str {
        match self {
            RateKind::Half => "0.5x",
            RateKind::Normal => "1x",
            RateKind::Double => "2x",
            RateKind::Quad => "4x",
        }
    }
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}
