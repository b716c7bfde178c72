//! Library composition
//!
//! Owns the stores, the selection and the playback controller, and wires
//! the user-level operations across them. There is no global instance; the
//! embedding application constructs one and passes it around.

use crate::config::PlayerConfig;
use crate::controller::PlaybackController;
use crate::cursor::QueueCursor;
use crate::error::{PlaybackError, Result};
use crate::selection::SelectionQueue;
use crate::shuffle::shuffled_indices;
use crate::transport::TransportFactory;
use rhythmic_core::types::Index;
use rhythmic_core::{Persistence, RateKind, RhythmKind, Session, TempoDetector, Track};
use rhythmic_storage::{
    JsonFilePersistence, SessionStore, SharedSessionStore, SharedTrackStore, SortedView,
    TrackSort, TrackStore,
};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Facade tying the track and session stores to the selection queue and
/// the playback controller
///
/// Selection indices always refer to the track store. Deletions shift them
/// and unload the controller when the playing track goes away.
pub struct Library {
    tracks: SharedTrackStore,
    sessions: SharedSessionStore,
    selection: SelectionQueue,
    playback: PlaybackController,
    tempo: Option<Arc<dyn TempoDetector>>,
}

impl Library {
    pub fn new(
        tracks: TrackStore,
        sessions: SessionStore,
        factory: Arc<dyn TransportFactory>,
        config: &PlayerConfig,
    ) -> Self {
        let tracks = tracks.into_shared();
        let playback = PlaybackController::new(
            tracks.clone(),
            factory,
            config.playback.clone(),
            config.rhythm.clone(),
        );
        Self {
            tracks,
            sessions: sessions.into_shared(),
            selection: SelectionQueue::new(),
            playback,
            tempo: None,
        }
    }

    /// Load both stores from `persistence`, using `defaults` when no tracks
    /// were saved yet
    pub async fn open(
        config: &PlayerConfig,
        persistence: Arc<dyn Persistence>,
        factory: Arc<dyn TransportFactory>,
        defaults: Vec<Track>,
    ) -> Result<Self> {
        let tracks = TrackStore::load(persistence.clone(), defaults).await?;
        let sessions = SessionStore::load(persistence).await?;
        info!(
            tracks = tracks.len(),
            sessions = sessions.len(),
            "Library opened"
        );
        Ok(Self::new(tracks, sessions, factory, config))
    }

    /// [`Library::open`] with JSON files under `config.storage.data_dir`
    pub async fn open_json(
        config: &PlayerConfig,
        factory: Arc<dyn TransportFactory>,
        defaults: Vec<Track>,
    ) -> Result<Self> {
        let persistence = Arc::new(JsonFilePersistence::new(&config.storage.data_dir));
        Self::open(config, persistence, factory, defaults).await
    }

    pub fn with_tempo_detector(mut self, detector: Arc<dyn TempoDetector>) -> Self {
        self.tempo = Some(detector);
        self
    }

    pub fn tracks(&self) -> &SharedTrackStore {
        &self.tracks
    }

    pub fn sessions(&self) -> &SharedSessionStore {
        &self.sessions
    }

    pub fn selection(&self) -> &SelectionQueue {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionQueue {
        &mut self.selection
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Play one track, selecting it first if needed
    ///
    /// The selection is cleared once playback has started.
    pub fn play_track(&mut self, index: Index) -> Result<()> {
        if self.read_tracks().get_exact(index).is_none() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        self.selection.safe_select_cell(index);
        let mut cursor = QueueCursor::from_selection(&self.selection)?;
        cursor.set_position(cursor.position_of(index));
        self.begin(cursor)?;
        self.selection.reset();
        Ok(())
    }

    /// Play the current selection from its first entry
    pub fn play_selection(&mut self) -> Result<()> {
        let cursor = QueueCursor::from_selection(&self.selection)?;
        self.begin(cursor)
    }

    /// Select every track in store order and play
    pub fn play_all(&mut self) -> Result<()> {
        let len = self.read_tracks().len();
        self.replace_selection(0..len)?;
        self.play_selection()
    }

    /// Select every track in random order and play
    pub fn play_shuffled(&mut self) -> Result<()> {
        let len = self.read_tracks().len();
        self.replace_selection(shuffled_indices(len))?;
        self.play_selection()
    }

    /// Select a session's tracks and play them
    ///
    /// Members no longer in the track store are skipped.
    pub fn play_session(&mut self, session: Index) -> Result<()> {
        let members = self
            .read_sessions()
            .tracks_in(session)
            .map(<[Track]>::to_vec)
            .ok_or(PlaybackError::IndexOutOfBounds(session))?;

        let indices: Vec<Index> = {
            let store = self.read_tracks();
            members
                .iter()
                .filter_map(|track| {
                    let index = store.index_of(track);
                    if index.is_none() {
                        warn!(title = %track.title, "Session track missing from library");
                    }
                    index
                })
                .collect()
        };

        self.replace_selection(indices)?;
        self.play_selection()
    }

    fn replace_selection(&mut self, indices: impl IntoIterator<Item = Index>) -> Result<()> {
        let indices: Vec<Index> = indices.into_iter().collect();
        if indices.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        self.selection.reset();
        self.selection.append_all(indices);
        Ok(())
    }

    fn begin(&mut self, cursor: QueueCursor) -> Result<()> {
        self.selection.mark_synced();
        self.playback.load_queue(cursor);
        self.playback.start()
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Save the selected tracks as a new session
    pub fn save_selection_as_session(&mut self, title: impl Into<String>) -> Result<()> {
        let queued = self.selection.queued().ok_or(PlaybackError::QueueEmpty)?;
        let tracks = self.read_tracks().tracks_for_indices(queued);
        let session = Session::new(title, tracks);
        debug!(title = %session.title, tracks = session.len(), "Saving selection as session");
        self.write_sessions().add(session)?;
        Ok(())
    }

    pub fn delete_session(&mut self, session: Index) -> Option<Session> {
        self.write_sessions().delete(session)
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    /// Remove a track from the library and from every session
    ///
    /// The selection is adjusted to the shifted indices. A loaded queue
    /// refers to the old indices, so playback is stopped and unloaded.
    pub fn delete_track(&mut self, index: Index) -> Option<Track> {
        let removed = self.write_tracks().remove(index)?;
        let purged = self.write_sessions().purge_track(&removed);
        self.selection.track_removed(index);
        if self.playback.cursor().is_some() {
            self.playback.unload();
        }
        info!(title = %removed.title, purged, "Deleted track");
        Some(removed)
    }

    /// Import a file using the tempo detector
    ///
    /// `Ok(None)` when there is no detector or no usable tempo; the caller
    /// should ask for one and use [`Library::add_track_with_bpm`].
    pub async fn import_track(&mut self, file: &Path) -> Result<Option<Track>> {
        let Some(detector) = self.tempo.clone() else {
            return Ok(None);
        };
        match detector.detect_tempo(file).await {
            Some(bpm) if bpm.is_finite() && bpm > 0.0 => self.add_track_with_bpm(file, bpm).map(Some),
            _ => {
                debug!(file = %file.display(), "No tempo detected");
                Ok(None)
            }
        }
    }

    /// Add a file with a known tempo
    pub fn add_track_with_bpm(&mut self, file: &Path, bpm: f64) -> Result<Track> {
        let track = Track::from_file(file, bpm)?;
        self.write_tracks().append(track.clone())?;
        Ok(track)
    }

    pub fn set_rhythm(&mut self, index: Index, rhythm: RhythmKind) -> bool {
        self.write_tracks().set_rhythm(index, rhythm)
    }

    pub fn set_rate(&mut self, index: Index, rate: RateKind) -> bool {
        self.write_tracks().set_rate(index, rate)
    }

    /// Rhythm, rate and period summary of a track
    pub fn detail(&self, index: Index) -> Option<String> {
        self.read_tracks().get_exact(index).map(Track::detail)
    }

    pub fn sorted_view(&self, sort: TrackSort) -> SortedView {
        SortedView::new(sort, self.read_tracks().tracks())
    }

    /// Wait for every queued save to be attempted
    pub async fn flush(&self) {
        let tracks = self.read_tracks().persist_writer();
        let sessions = self.read_sessions().persist_writer();
        if let Some(writer) = tracks {
            writer.flush().await;
        }
        if let Some(writer) = sessions {
            writer.flush().await;
        }
    }

    fn read_tracks(&self) -> RwLockReadGuard<'_, TrackStore> {
        self.tracks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tracks(&self) -> RwLockWriteGuard<'_, TrackStore> {
        self.tracks.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_sessions(&self) -> RwLockReadGuard<'_, SessionStore> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, SessionStore> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
