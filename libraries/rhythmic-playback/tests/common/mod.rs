//! Shared test infrastructure for playback integration tests

#![allow(dead_code)]

use rhythmic_core::Track;
use rhythmic_playback::{
    AudioTransport, PlaybackConfig, PlaybackController, PlaybackError, Result, RhythmConfig,
    TransportFactory, TransportNotifier,
};
use rhythmic_storage::TrackStore;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Route controller logs to the test writer, once per binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Length of every mock track
pub const TRACK_LENGTH: Duration = Duration::from_secs(180);

/// Observable state of a mock transport
#[derive(Debug)]
pub struct Probe {
    pub pan: f32,
    pub volume: f32,
    pub playing: bool,
    pub stopped: bool,
    pub current: Duration,
    pub duration: Duration,
}

pub type SharedProbe = Arc<Mutex<Probe>>;

pub fn probe(probe: &SharedProbe) -> MutexGuard<'_, Probe> {
    probe.lock().unwrap()
}

/// In-memory transport with externally visible state
struct MockTransport {
    probe: SharedProbe,
}

impl MockTransport {
    fn state(&self) -> MutexGuard<'_, Probe> {
        self.probe.lock().unwrap()
    }
}

impl AudioTransport for MockTransport {
    fn play(&mut self) -> bool {
        self.state().playing = true;
        true
    }

    fn pause(&mut self) {
        self.state().playing = false;
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.playing = false;
        state.stopped = true;
    }

    fn is_playing(&self) -> bool {
        self.state().playing
    }

    fn current_time(&self) -> Duration {
        self.state().current
    }

    fn set_current_time(&mut self, time: Duration) {
        self.state().current = time;
    }

    fn duration(&self) -> Duration {
        self.state().duration
    }

    fn pan(&self) -> f32 {
        self.state().pan
    }

    fn set_pan(&mut self, pan: f32) {
        self.state().pan = pan;
    }

    fn volume(&self) -> f32 {
        self.state().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.state().volume = volume;
    }
}

/// A transport the factory handed out
#[derive(Clone)]
pub struct Opened {
    pub title: String,
    pub notifier: TransportNotifier,
    pub probe: SharedProbe,
}

/// Factory that records opened transports and refuses "broken" files
#[derive(Default)]
pub struct MockFactory {
    opened: Mutex<Vec<Opened>>,
    broken: Mutex<HashSet<PathBuf>>,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make opening `file` fail from now on
    pub fn break_file(&self, file: impl Into<PathBuf>) {
        self.broken.lock().unwrap().insert(file.into());
    }

    pub fn opened_titles(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.title.clone())
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    /// Most recently opened transport
    pub fn last(&self) -> Opened {
        self.opened
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transport opened")
    }
}

impl TransportFactory for MockFactory {
    fn open(&self, track: &Track, notifier: TransportNotifier) -> Result<Box<dyn AudioTransport>> {
        if self.broken.lock().unwrap().contains(&track.file) {
            return Err(PlaybackError::transport(format!(
                "cannot decode {}",
                track.file.display()
            )));
        }

        let probe = Arc::new(Mutex::new(Probe {
            pan: 0.0,
            volume: 1.0,
            playing: false,
            stopped: false,
            current: Duration::ZERO,
            duration: TRACK_LENGTH,
        }));
        self.opened.lock().unwrap().push(Opened {
            title: track.title.clone(),
            notifier,
            probe: probe.clone(),
        });
        Ok(Box::new(MockTransport { probe }))
    }
}

/// `n` tracks titled "Track i" backed by "track{i}.mp3", one second period
pub fn numbered_tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| Track::new(format!("Track {i}"), 1.0, format!("track{i}.mp3")))
        .collect()
}

pub fn controller_with(tracks: Vec<Track>) -> (PlaybackController, Arc<MockFactory>) {
    init_tracing();
    let factory = MockFactory::new();
    let controller = PlaybackController::new(
        TrackStore::new(tracks).into_shared(),
        factory.clone(),
        PlaybackConfig::default(),
        RhythmConfig::default(),
    );
    (controller, factory)
}

/// Advance paused time and let spawned drivers run
pub async fn advance(by: Duration) {
    tokio::time::advance(by).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}
