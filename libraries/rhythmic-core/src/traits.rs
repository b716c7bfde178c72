/// Collaborator traits for Rhythmic Player
use async_trait::async_trait;
use std::path::Path;

/// Tempo detection
///
/// Implementers analyse an audio file and report its tempo in beats per
/// minute. `None` means the tempo is unknown and has to be asked for.
#[async_trait]
pub trait TempoDetector: Send + Sync {
    /// Detect the tempo of the file at `path`
    async fn detect_tempo(&self, path: &Path) -> Option<f64>;
}
