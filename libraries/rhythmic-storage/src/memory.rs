//! Process-local `Persistence` used by tests and ephemeral sessions

use async_trait::async_trait;
use rhythmic_core::{Persistence, Result, RhythmicError, Session, Track};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Keeps the last saved collections in memory
///
/// Counts successful saves and can be switched into a failing mode to
/// exercise the stores' error policy.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    tracks: Mutex<Option<Vec<Track>>>,
    sessions: Mutex<Option<Vec<Session>>>,
    track_saves: AtomicUsize,
    session_saves: AtomicUsize,
    failing: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a persisted track list
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        let persistence = Self::default();
        *lock(&persistence.tracks) = Some(tracks);
        persistence
    }

    /// Add a persisted session list
    pub fn and_sessions(self, sessions: Vec<Session>) -> Self {
        *lock(&self.sessions) = Some(sessions);
        self
    }

    /// Make every load and save fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn saved_tracks(&self) -> Option<Vec<Track>> {
        lock(&self.tracks).clone()
    }

    pub fn saved_sessions(&self) -> Option<Vec<Session>> {
        lock(&self.sessions).clone()
    }

    /// Number of successful track saves
    pub fn track_saves(&self) -> usize {
        self.track_saves.load(Ordering::SeqCst)
    }

    /// Number of successful session saves
    pub fn session_saves(&self) -> usize {
        self.session_saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RhythmicError::storage("in-memory persistence set to fail"));
        }
        Ok(())
    }
}

#[async_trait]
impl Persistence for InMemoryPersistence {
    async fn load_tracks(&self) -> Result<Option<Vec<Track>>> {
        self.check()?;
        Ok(lock(&self.tracks).clone())
    }

    async fn save_tracks(&self, tracks: &[Track]) -> Result<()> {
        self.check()?;
        *lock(&self.tracks) = Some(tracks.to_vec());
        self.track_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_sessions(&self) -> Result<Option<Vec<Session>>> {
        self.check()?;
        Ok(lock(&self.sessions).clone())
    }

    async fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        self.check()?;
        *lock(&self.sessions) = Some(sessions.to_vec());
        self.session_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
