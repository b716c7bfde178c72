//! Canonical ordered track collection

use crate::persist::PersistWriter;
use rhythmic_core::types::Index;
use rhythmic_core::{Persistence, RateKind, Result, RhythmKind, Track};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Track store shared between the library and the playback controller
pub type SharedTrackStore = Arc<RwLock<TrackStore>>;

/// Ordered list of every track known to the player
///
/// Each mutation queues a save of the whole list. Without a writer the
/// store is purely in-memory.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
    writer: Option<PersistWriter>,
}

impl TrackStore {
    /// In-memory store that never persists
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            writer: None,
        }
    }

    /// Store whose mutations are saved through `writer`
    pub fn with_writer(tracks: Vec<Track>, writer: PersistWriter) -> Self {
        Self {
            tracks,
            writer: Some(writer),
        }
    }

    /// Load persisted tracks, falling back to `defaults` when nothing is stored
    ///
    /// A failing load is logged and treated like absence.
    ///
    /// # Errors
    /// Returns an error only when the persistence writer cannot be spawned
    pub async fn load(persistence: Arc<dyn Persistence>, defaults: Vec<Track>) -> Result<Self> {
        let tracks = match persistence.load_tracks().await {
            Ok(Some(tracks)) => {
                info!(count = tracks.len(), "Loaded tracks");
                tracks
            }
            Ok(None) => {
                info!(count = defaults.len(), "No persisted tracks, using defaults");
                defaults
            }
            Err(e) => {
                warn!(error = %e, "Failed to load tracks, using defaults");
                defaults
            }
        };

        let writer = PersistWriter::spawn(persistence)?;
        Ok(Self::with_writer(tracks, writer))
    }

    /// Wrap in the shared handle used across components
    pub fn into_shared(self) -> SharedTrackStore {
        Arc::new(RwLock::new(self))
    }

    /// Track at `index`, or the first track when `index` is past the end
    ///
    /// Returns `None` only for an empty store. Use [`TrackStore::get_exact`]
    /// when overflow must not wrap.
    pub fn get(&self, index: Index) -> Option<&Track> {
        self.tracks.get(index).or_else(|| self.tracks.first())
    }

    /// Track at `index` without wraparound
    pub fn get_exact(&self, index: Index) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Replace the track at `index`, returning the previous one
    ///
    /// `Ok(None)` when `index` is out of range.
    ///
    /// # Errors
    /// Returns `InvalidInput` for a track whose period could not be saved
    pub fn set(&mut self, index: Index, track: Track) -> Result<Option<Track>> {
        track.validate()?;
        let Some(slot) = self.tracks.get_mut(index) else {
            return Ok(None);
        };
        let previous = std::mem::replace(slot, track);
        self.persist();
        Ok(Some(previous))
    }

    /// Add a track at the end
    ///
    /// # Errors
    /// Returns `InvalidInput` for a track whose period could not be saved;
    /// the store is left untouched
    pub fn append(&mut self, track: Track) -> Result<()> {
        track.validate()?;
        debug!(title = %track.title, "Appending track");
        self.tracks.push(track);
        self.persist();
        Ok(())
    }

    /// Remove and return the track at `index`
    pub fn remove(&mut self, index: Index) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);
        debug!(title = %removed.title, index, "Removed track");
        self.persist();
        Some(removed)
    }

    /// Tracks for `indices` in the given order, duplicates included
    ///
    /// Indices past the end wrap like [`TrackStore::get`].
    pub fn tracks_for_indices(&self, indices: &[Index]) -> Vec<Track> {
        indices
            .iter()
            .filter_map(|&index| self.get(index).cloned())
            .collect()
    }

    /// Index of the first structurally equal track
    pub fn index_of(&self, track: &Track) -> Option<Index> {
        self.tracks.iter().position(|t| t == track)
    }

    /// Change the rhythm of one track; `false` if `index` is out of range
    pub fn set_rhythm(&mut self, index: Index, rhythm: RhythmKind) -> bool {
        let Some(track) = self.tracks.get_mut(index) else {
            return false;
        };
        track.rhythm = rhythm;
        self.persist();
        true
    }

    /// Change the rate of one track; `false` if `index` is out of range
    pub fn set_rate(&mut self, index: Index, rate: RateKind) -> bool {
        let Some(track) = self.tracks.get_mut(index) else {
            return false;
        };
        track.rate = rate;
        self.persist();
        true
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Handle for awaiting queued saves without holding the store
    pub fn persist_writer(&self) -> Option<PersistWriter> {
        self.writer.clone()
    }

    /// Wait for queued saves to be attempted
    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    fn persist(&self) {
        if let Some(writer) = &self.writer {
            writer.save_tracks(self.tracks.clone());
        }
    }
}

impl<'a> IntoIterator for &'a TrackStore {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryPersistence;

    fn three_tracks() -> Vec<Track> {
        vec![
            Track::new("Alpha", 1.0, "alpha.mp3"),
            Track::new("Beta", 0.5, "beta.mp3"),
            Track::new("Gamma", 0.25, "gamma.mp3"),
        ]
    }

    #[test]
    fn test_get_wraps_on_overflow() {
        let store = TrackStore::new(three_tracks());
        assert_eq!(store.get(1).unwrap().title, "Beta");
        assert_eq!(store.get(3).unwrap().title, "Alpha");
        assert_eq!(store.get(100).unwrap().title, "Alpha");
        assert!(store.get_exact(3).is_none());
    }

    #[test]
    fn test_get_on_empty_store() {
        let store = TrackStore::default();
        assert!(store.get(0).is_none());
        assert!(store.tracks_for_indices(&[0, 1]).is_empty());
    }

    #[test]
    fn test_tracks_for_indices_keeps_order_and_duplicates() {
        let store = TrackStore::new(three_tracks());
        let titles: Vec<_> = store
            .tracks_for_indices(&[2, 0, 2])
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Gamma", "Alpha", "Gamma"]);
    }

    #[test]
    fn test_remove_and_set_bounds() {
        let mut store = TrackStore::new(three_tracks());
        assert!(store.remove(3).is_none());
        assert!(store
            .set(3, Track::new("Delta", 1.0, "delta.mp3"))
            .unwrap()
            .is_none());

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.title, "Alpha");
        assert_eq!(store.len(), 2);

        let previous = store
            .set(0, Track::new("Delta", 1.0, "delta.mp3"))
            .unwrap()
            .unwrap();
        assert_eq!(previous.title, "Beta");
        assert_eq!(store.get(0).unwrap().title, "Delta");
    }

    #[tokio::test]
    async fn test_unsaveable_periods_are_rejected() {
        let persistence = Arc::new(InMemoryPersistence::new());
        let mut store = TrackStore::load(persistence.clone(), three_tracks())
            .await
            .unwrap();

        assert!(store.append(Track::new("Drone", f64::INFINITY, "drone.wav")).is_err());
        assert!(store.append(Track::new("Drone", f64::NAN, "drone.wav")).is_err());
        assert!(store.set(0, Track::new("Drone", 0.0, "drone.wav")).is_err());
        store.flush().await;

        assert_eq!(store.tracks(), three_tracks().as_slice());
        assert_eq!(persistence.track_saves(), 0);
    }

    #[test]
    fn test_style_changes_keep_identity() {
        let mut store = TrackStore::new(three_tracks());
        assert!(store.set_rhythm(1, RhythmKind::Crosspan));
        assert!(store.set_rate(1, RateKind::Double));
        assert!(!store.set_rate(9, RateKind::Double));

        let beta = store.get(1).unwrap();
        assert_eq!(beta.rhythm, RhythmKind::Crosspan);
        assert_eq!(beta.rate, RateKind::Double);
        assert_eq!(store.index_of(&Track::new("Beta", 0.5, "beta.mp3")), Some(1));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_defaults() {
        let persistence = Arc::new(InMemoryPersistence::new());
        let store = TrackStore::load(persistence, three_tracks()).await.unwrap();
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_load_prefers_persisted_tracks() {
        let persistence = Arc::new(InMemoryPersistence::with_tracks(vec![Track::new(
            "Saved", 1.0, "saved.mp3",
        )]));
        let store = TrackStore::load(persistence, three_tracks()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().title, "Saved");
    }

    #[tokio::test]
    async fn test_load_failure_uses_defaults() {
        let persistence = Arc::new(InMemoryPersistence::new());
        persistence.set_failing(true);
        let store = TrackStore::load(persistence, three_tracks()).await.unwrap();
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_every_mutation_persists() {
        let persistence = Arc::new(InMemoryPersistence::new());
        let mut store = TrackStore::load(persistence.clone(), three_tracks())
            .await
            .unwrap();

        store.append(Track::new("Delta", 1.0, "delta.mp3")).unwrap();
        store.remove(0);
        store.set(0, Track::new("Epsilon", 2.0, "epsilon.mp3")).unwrap();
        store.set_rhythm(0, RhythmKind::Stitch);
        store.remove(42);
        store.flush().await;

        assert_eq!(persistence.track_saves(), 4);
        let saved = persistence.saved_tracks().unwrap();
        assert_eq!(saved, store.tracks());
        assert_eq!(saved[0].rhythm, RhythmKind::Stitch);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_memory_state() {
        let persistence = Arc::new(InMemoryPersistence::new());
        let mut store = TrackStore::load(persistence.clone(), three_tracks())
            .await
            .unwrap();
        persistence.set_failing(true);

        store.append(Track::new("Delta", 1.0, "delta.mp3")).unwrap();
        store.flush().await;

        assert_eq!(store.len(), 4);
        assert!(persistence.saved_tracks().is_none());
    }
}
