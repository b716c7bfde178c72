//! Persistence collaborator for track and session lists

use crate::error::Result;
use crate::types::{Session, Track};
use async_trait::async_trait;

/// Durable store for the track and session collections
///
/// `Ok(None)` from a load means nothing has been persisted yet; callers fall
/// back to their defaults. Saves always receive the full collection.
#[async_trait]
pub trait Persistence: Send + Sync {
    // ========================================================================
    // Tracks
    // ========================================================================

    /// Load the persisted track list, if any
    async fn load_tracks(&self) -> Result<Option<Vec<Track>>>;

    /// Replace the persisted track list
    async fn save_tracks(&self, tracks: &[Track]) -> Result<()>;

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Load the persisted session list, if any
    async fn load_sessions(&self) -> Result<Option<Vec<Session>>>;

    /// Replace the persisted session list
    async fn save_sessions(&self, sessions: &[Session]) -> Result<()>;
}
