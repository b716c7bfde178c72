//! Library composition tests
//!
//! Covers the user-level operations that span stores, selection and
//! playback: deleting tracks referenced by sessions, playing tracks,
//! sessions and shuffles, importing with and without tempo detection.

mod common;

use async_trait::async_trait;
use common::{init_tracing, MockFactory};
use rhythmic_core::{RateKind, RhythmKind, Session, TempoDetector, Track};
use rhythmic_playback::{Library, PlaybackError, PlaybackState, PlayerConfig};
use rhythmic_storage::{InMemoryPersistence, TrackSort};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

// ===== Helpers =====

fn track(title: &str, period: f64) -> Track {
    Track::new(title, period, format!("{}.mp3", title.to_lowercase()))
}

fn abc() -> Vec<Track> {
    vec![track("Alpha", 1.0), track("Beta", 0.5), track("Gamma", 2.0)]
}

async fn library_with(
    persistence: Arc<InMemoryPersistence>,
    defaults: Vec<Track>,
) -> (Library, Arc<MockFactory>) {
    init_tracing();
    let factory = MockFactory::new();
    let library = Library::open(
        &PlayerConfig::default(),
        persistence,
        factory.clone(),
        defaults,
    )
    .await
    .unwrap();
    (library, factory)
}

struct FixedTempo(Option<f64>);

#[async_trait]
impl TempoDetector for FixedTempo {
    async fn detect_tempo(&self, _path: &Path) -> Option<f64> {
        self.0
    }
}

// ===== Opening =====

#[tokio::test]
async fn test_open_uses_defaults_without_saved_tracks() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let (library, _) = library_with(persistence, abc()).await;

    assert_eq!(library.tracks().read().unwrap().len(), 3);
    assert!(library.sessions().read().unwrap().is_empty());
}

#[tokio::test]
async fn test_open_prefers_saved_state() {
    let saved = vec![track("Saved", 1.0)];
    let persistence = Arc::new(
        InMemoryPersistence::with_tracks(saved.clone())
            .and_sessions(vec![Session::new("Morning", saved.clone())]),
    );
    let (library, _) = library_with(persistence, abc()).await;

    assert_eq!(library.tracks().read().unwrap().tracks(), saved.as_slice());
    assert_eq!(library.sessions().read().unwrap().len(), 1);
}

#[tokio::test]
async fn test_open_falls_back_when_load_fails() {
    let persistence = Arc::new(InMemoryPersistence::with_tracks(vec![track("Saved", 1.0)]));
    persistence.set_failing(true);
    let (library, _) = library_with(persistence, abc()).await;

    assert_eq!(library.tracks().read().unwrap().tracks(), abc().as_slice());
}

// ===== Deleting =====

#[tokio::test]
async fn test_delete_track_purges_every_session() {
    let tracks = abc();
    let persistence = Arc::new(
        InMemoryPersistence::with_tracks(tracks.clone()).and_sessions(vec![
            Session::new("First", vec![tracks[0].clone(), tracks[1].clone()]),
            Session::new("Second", vec![tracks[1].clone(), tracks[2].clone()]),
        ]),
    );
    let (mut library, _) = library_with(persistence.clone(), vec![]).await;

    let removed = library.delete_track(1).unwrap();
    assert_eq!(removed.title, "Beta");

    {
        let sessions = library.sessions().read().unwrap();
        assert_eq!(sessions.tracks_in(0).unwrap(), &[tracks[0].clone()]);
        assert_eq!(sessions.tracks_in(1).unwrap(), &[tracks[2].clone()]);
    }
    assert_eq!(
        library.tracks().read().unwrap().tracks(),
        &[tracks[0].clone(), tracks[2].clone()]
    );

    library.flush().await;
    assert_eq!(persistence.saved_tracks().unwrap().len(), 2);
    let saved = persistence.saved_sessions().unwrap();
    assert!(saved.iter().all(|session| !session.contains(&tracks[1])));
}

#[tokio::test]
async fn test_delete_track_shifts_selection_and_unloads_queue() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;
    library.play_all().unwrap();
    library.selection_mut().reset();
    library.selection_mut().append_all([0, 2]);

    library.delete_track(0).unwrap();

    assert_eq!(library.selection().selected(), &[1]);
    assert!(library.playback().cursor().is_none());
    assert_eq!(library.playback().state(), PlaybackState::Stopped);
}

#[tokio::test]
async fn test_delete_missing_track() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;
    assert!(library.delete_track(7).is_none());
    assert_eq!(library.tracks().read().unwrap().len(), 3);
}

// ===== Playing =====

#[tokio::test]
async fn test_play_track_alone() {
    let (mut library, factory) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;

    library.play_track(2).unwrap();

    assert_eq!(library.playback().now_playing(), Some(2));
    assert_eq!(library.playback().cursor().unwrap().queued(), &[2]);
    assert!(library.selection().is_empty());
    assert_eq!(factory.opened_titles(), vec!["Gamma"]);
}

#[tokio::test]
async fn test_play_track_joins_selection() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;
    library.selection_mut().append_all([0, 2]);

    library.play_track(1).unwrap();

    let cursor = library.playback().cursor().unwrap();
    assert_eq!(cursor.queued(), &[0, 2, 1]);
    assert_eq!(cursor.position(), 2);
    assert_eq!(library.playback().now_playing(), Some(1));
    assert!(library.selection().is_empty());
}

#[tokio::test]
async fn test_play_track_out_of_range() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;
    assert!(matches!(
        library.play_track(3),
        Err(PlaybackError::IndexOutOfBounds(3))
    ));
    assert!(library.selection().is_empty());
}

#[tokio::test]
async fn test_play_all_in_store_order() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;
    library.play_all().unwrap();

    assert_eq!(library.playback().cursor().unwrap().queued(), &[0, 1, 2]);
    assert_eq!(library.playback().now_playing(), Some(0));
    assert!(!library.selection().changed_since_playback());
}

#[tokio::test]
async fn test_play_all_on_empty_library() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), vec![]).await;
    assert!(matches!(library.play_all(), Err(PlaybackError::QueueEmpty)));
}

#[tokio::test]
async fn test_play_shuffled_is_a_permutation() {
    let tracks: Vec<Track> = (0..20).map(|i| track(&format!("T{i}"), 1.0)).collect();
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), tracks).await;

    library.play_shuffled().unwrap();

    let queued: HashSet<usize> = library
        .playback()
        .cursor()
        .unwrap()
        .queued()
        .iter()
        .copied()
        .collect();
    assert_eq!(queued, (0..20).collect::<HashSet<_>>());
    assert!(library.playback().is_playing());
}

#[tokio::test]
async fn test_play_session_skips_missing_members() {
    let tracks = abc();
    let stranger = track("Stranger", 1.0);
    let persistence = Arc::new(
        InMemoryPersistence::with_tracks(tracks.clone()).and_sessions(vec![Session::new(
            "Evening",
            vec![tracks[2].clone(), stranger, tracks[0].clone()],
        )]),
    );
    let (mut library, _) = library_with(persistence, vec![]).await;

    library.play_session(0).unwrap();
    assert_eq!(library.playback().cursor().unwrap().queued(), &[2, 0]);
    assert_eq!(library.playback().now_playing(), Some(2));

    assert!(matches!(
        library.play_session(4),
        Err(PlaybackError::IndexOutOfBounds(4))
    ));
}

// ===== Sessions =====

#[tokio::test]
async fn test_save_selection_as_session() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let (mut library, _) = library_with(persistence.clone(), abc()).await;

    assert!(matches!(
        library.save_selection_as_session("Empty"),
        Err(PlaybackError::QueueEmpty)
    ));

    library.selection_mut().append_all([2, 0]);
    library.save_selection_as_session("Focus").unwrap();

    {
        let sessions = library.sessions().read().unwrap();
        let session = sessions.get(0).unwrap();
        assert_eq!(session.title, "Focus");
        let titles: Vec<_> = session.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Gamma", "Alpha"]);
    }

    library.flush().await;
    assert_eq!(persistence.saved_sessions().unwrap().len(), 1);

    assert_eq!(library.delete_session(0).unwrap().title, "Focus");
    assert!(library.delete_session(0).is_none());
}

// ===== Tracks =====

#[tokio::test]
async fn test_import_without_detector_asks_for_tempo() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), vec![]).await;

    let imported = library.import_track(Path::new("music/rain.mp3")).await.unwrap();
    assert!(imported.is_none());
    assert!(library.tracks().read().unwrap().is_empty());

    let added = library
        .add_track_with_bpm(Path::new("music/rain.mp3"), 120.0)
        .unwrap();
    assert_eq!(added.title, "rain");
    assert_eq!(added.period, 0.5);
    assert_eq!(library.tracks().read().unwrap().len(), 1);
}

#[tokio::test]
async fn test_import_with_detector() {
    let (library, _) = library_with(Arc::new(InMemoryPersistence::new()), vec![]).await;
    let mut library = library.with_tempo_detector(Arc::new(FixedTempo(Some(60.0))));

    let imported = library
        .import_track(Path::new("waves.flac"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(imported.title, "waves");
    assert_eq!(imported.period, 1.0);
    assert_eq!(library.tracks().read().unwrap().get(0), Some(&imported));
}

#[tokio::test]
async fn test_import_ignores_unusable_tempo() {
    let (library, _) = library_with(Arc::new(InMemoryPersistence::new()), vec![]).await;
    let mut library = library.with_tempo_detector(Arc::new(FixedTempo(Some(0.0))));

    assert!(library
        .import_track(Path::new("silence.wav"))
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        library.add_track_with_bpm(Path::new("silence.wav"), -4.0),
        Err(PlaybackError::Core(_))
    ));
}

#[tokio::test]
async fn test_import_rejects_tempo_too_small_to_save() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;

    assert!(matches!(
        library.add_track_with_bpm(Path::new("hum.wav"), 1e-308),
        Err(PlaybackError::Core(_))
    ));
    assert_eq!(library.tracks().read().unwrap().len(), 3);
}

#[tokio::test]
async fn test_style_changes_show_in_detail() {
    let (mut library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;

    assert_eq!(library.detail(1).unwrap(), "Bilateral : 1x : 0.500");
    assert!(library.set_rhythm(1, RhythmKind::Stitch));
    assert!(library.set_rate(1, RateKind::Half));
    assert_eq!(library.detail(1).unwrap(), "Swave : 0.5x : 1.000");

    assert!(!library.set_rhythm(9, RhythmKind::Crosspan));
    assert!(library.detail(9).is_none());
}

#[tokio::test]
async fn test_sorted_view_by_tempo() {
    let (library, _) = library_with(Arc::new(InMemoryPersistence::new()), abc()).await;
    let view = library.sorted_view(TrackSort::Tempo);

    assert_eq!(view.indices(), &[1, 0, 2]);
    assert_eq!(view.view_index(2), Some(2));
    assert_eq!(view.master_index(0), Some(1));
}
