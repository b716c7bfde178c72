//! JSON file `Persistence`: one file per collection under a data directory

use async_trait::async_trait;
use rhythmic_core::{Persistence, Result, Session, Track};
use serde_json::{from_slice, to_vec_pretty};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the persisted track list
pub const TRACKS_FILE: &str = "tracks.json";

/// File name of the persisted session list
pub const SESSIONS_FILE: &str = "sessions.json";

/// Stores `tracks.json` and `sessions.json` in a directory
///
/// A missing file reads as "nothing persisted". Saves go through a
/// temporary file and a rename so a reader never sees a half-written list.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    root: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.root.join(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted data");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(from_slice(&bytes)?))
    }

    async fn write<T: serde::Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = to_vec_pretty(value)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        let staging = self.root.join(format!(".{name}.tmp"));
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl Persistence for JsonFilePersistence {
    async fn load_tracks(&self) -> Result<Option<Vec<Track>>> {
        self.read(TRACKS_FILE).await
    }

    async fn save_tracks(&self, tracks: &[Track]) -> Result<()> {
        self.write(TRACKS_FILE, tracks).await
    }

    async fn load_sessions(&self) -> Result<Option<Vec<Session>>> {
        self.read(SESSIONS_FILE).await
    }

    async fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        self.write(SESSIONS_FILE, sessions).await
    }
}
