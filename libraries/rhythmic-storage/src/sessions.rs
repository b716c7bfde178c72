//! Ordered collection of named sessions

use crate::persist::PersistWriter;
use rhythmic_core::types::Index;
use rhythmic_core::{Persistence, RateKind, Result, RhythmKind, Session, Track};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Session store shared between components
pub type SharedSessionStore = Arc<RwLock<SessionStore>>;

/// Every saved session, in creation order
///
/// Bounds-checked operations never fail: absence comes back as `None` or
/// `false` and nothing is persisted. Successful mutations queue a save of
/// the full session list.
///
/// Removing a track from the track store does not touch sessions. The
/// caller must follow up with [`SessionStore::purge_track`].
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    writer: Option<PersistWriter>,
}

impl SessionStore {
    /// In-memory store that never persists
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            writer: None,
        }
    }

    pub fn with_writer(sessions: Vec<Session>, writer: PersistWriter) -> Self {
        Self {
            sessions,
            writer: Some(writer),
        }
    }

    /// Load persisted sessions; absence or a failed load yields an empty store
    pub async fn load(persistence: Arc<dyn Persistence>) -> Result<Self> {
        let sessions = match persistence.load_sessions().await {
            Ok(Some(sessions)) => {
                info!(count = sessions.len(), "Loaded sessions");
                sessions
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load sessions, starting empty");
                Vec::new()
            }
        };

        let writer = PersistWriter::spawn(persistence)?;
        Ok(Self::with_writer(sessions, writer))
    }

    pub fn into_shared(self) -> SharedSessionStore {
        Arc::new(RwLock::new(self))
    }

    /// Append a new session
    ///
    /// # Errors
    /// Returns `InvalidInput` if any member track has a period that could
    /// not be saved; nothing is added
    pub fn add(&mut self, session: Session) -> Result<()> {
        session.tracks.iter().try_for_each(Track::validate)?;
        debug!(title = %session.title, tracks = session.len(), "Adding session");
        self.sessions.push(session);
        self.persist();
        Ok(())
    }

    /// Delete the session at `index`
    pub fn delete(&mut self, index: Index) -> Option<Session> {
        if index >= self.sessions.len() {
            return None;
        }
        let removed = self.sessions.remove(index);
        self.persist();
        Some(removed)
    }

    /// Remove the first structurally equal track from a session
    pub fn remove_track(&mut self, track: &Track, session: Index) -> Option<Track> {
        let tracks = &mut self.sessions.get_mut(session)?.tracks;
        let position = tracks.iter().position(|t| t == track)?;
        let removed = tracks.remove(position);
        self.persist();
        Some(removed)
    }

    /// Remove the track at `track_index` from a session
    pub fn remove_track_at(&mut self, track_index: Index, session: Index) -> Option<Track> {
        let tracks = &mut self.sessions.get_mut(session)?.tracks;
        if track_index >= tracks.len() {
            return None;
        }
        let removed = tracks.remove(track_index);
        self.persist();
        Some(removed)
    }

    /// Append a track to a session
    ///
    /// `false` if the session does not exist or the track's period could
    /// not be saved.
    pub fn add_track(&mut self, track: Track, session: Index) -> bool {
        if track.validate().is_err() {
            return false;
        }
        let Some(target) = self.sessions.get_mut(session) else {
            return false;
        };
        target.tracks.push(track);
        self.persist();
        true
    }

    /// Remove every structurally equal track from every session
    ///
    /// Returns how many entries were removed. Persists once, and only if
    /// something changed.
    pub fn purge_track(&mut self, track: &Track) -> usize {
        let mut removed = 0;
        for session in &mut self.sessions {
            let before = session.tracks.len();
            session.tracks.retain(|t| t != track);
            removed += before - session.tracks.len();
        }

        if removed > 0 {
            debug!(title = %track.title, removed, "Purged track from sessions");
            self.persist();
        }
        removed
    }

    /// Move a member track within its session
    pub fn move_track(&mut self, session: Index, from: Index, to: Index) -> bool {
        let Some(target) = self.sessions.get_mut(session) else {
            return false;
        };
        let len = target.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let track = target.tracks.remove(from);
            target.tracks.insert(to, track);
            self.persist();
        }
        true
    }

    /// Change the rhythm of one member track; `false` on a miss
    pub fn set_rhythm(&mut self, session: Index, track_index: Index, rhythm: RhythmKind) -> bool {
        match self.track_mut(session, track_index) {
            Some(track) => track.rhythm = rhythm,
            None => return false,
        }
        self.persist();
        true
    }

    /// Change the rate of one member track; `false` on a miss
    pub fn set_rate(&mut self, session: Index, track_index: Index, rate: RateKind) -> bool {
        match self.track_mut(session, track_index) {
            Some(track) => track.rate = rate,
            None => return false,
        }
        self.persist();
        true
    }

    /// Apply one rhythm to every track in a session
    pub fn set_all_rhythms(&mut self, session: Index, rhythm: RhythmKind) -> bool {
        let Some(target) = self.sessions.get_mut(session) else {
            return false;
        };
        for track in &mut target.tracks {
            track.rhythm = rhythm;
        }
        self.persist();
        true
    }

    /// Session at `index`, if any
    pub fn get(&self, index: Index) -> Option<&Session> {
        self.sessions.get(index)
    }

    /// Member tracks of the session at `index`
    pub fn tracks_in(&self, index: Index) -> Option<&[Track]> {
        self.sessions.get(index).map(|s| s.tracks.as_slice())
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn persist_writer(&self) -> Option<PersistWriter> {
        self.writer.clone()
    }

    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    fn track_mut(&mut self, session: Index, track_index: Index) -> Option<&mut Track> {
        self.sessions.get_mut(session)?.tracks.get_mut(track_index)
    }

    fn persist(&self) {
        if let Some(writer) = &self.writer {
            writer.save_sessions(self.sessions.clone());
        }
    }
}
