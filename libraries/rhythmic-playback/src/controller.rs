//! Playback Session Controller
//!
//! Binds a [`QueueCursor`], the shared track store and the [`RhythmEngine`]
//! to a platform [`TransportFactory`]. The controller is the single owner
//! of playback state: every operation takes `&mut self`, and transport
//! callbacks arrive as [`TransportEvent`]s that the owner feeds back in
//! through [`PlaybackController::poll_transport_events`] or
//! [`PlaybackController::next_transport_event`].

use crate::cursor::QueueCursor;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::rhythm::{ProgressObserver, RhythmEngine};
use crate::transport::{
    lock_transport, SharedTransport, TransportEvent, TransportEventKind, TransportFactory,
    TransportNotifier,
};
use crate::types::{Interruption, PlaybackConfig, PlaybackState, RhythmConfig};
use rhythmic_core::types::{Index, Position};
use rhythmic_core::Track;
use rhythmic_storage::SharedTrackStore;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Track currently bound to an open transport
struct Loaded {
    index: Index,
    track: Track,
    transport: SharedTransport,
    generation: u64,
}

/// Which way to keep looking when an entry turns out to be unplayable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Drives playback of one queue at a time
pub struct PlaybackController {
    tracks: SharedTrackStore,
    factory: Arc<dyn TransportFactory>,
    config: PlaybackConfig,
    cursor: Option<QueueCursor>,
    rhythm: RhythmEngine,
    loaded: Option<Loaded>,
    state: PlaybackState,
    /// Bumped for every opened transport
    generation: u64,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new(
        tracks: SharedTrackStore,
        factory: Arc<dyn TransportFactory>,
        config: PlaybackConfig,
        rhythm: RhythmConfig,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        Self {
            tracks,
            factory,
            config,
            cursor: None,
            rhythm: RhythmEngine::new(rhythm),
            loaded: None,
            state: PlaybackState::Stopped,
            generation: 0,
            transport_tx,
            transport_rx,
            pending_events: Vec::new(),
        }
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Replace the queue, stopping whatever is playing
    pub fn load_queue(&mut self, cursor: QueueCursor) {
        self.stop();
        self.cursor = Some(cursor);
    }

    /// Stop and forget the queue
    pub fn unload(&mut self) {
        self.stop();
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<&QueueCursor> {
        self.cursor.as_ref()
    }

    // ========================================================================
    // Transport control
    // ========================================================================

    /// Play the track at the cursor's current position
    ///
    /// Failures are returned as-is; nothing is removed from the queue.
    pub fn start(&mut self) -> Result<()> {
        let result = self.try_start();
        if result.is_err() {
            self.set_state(PlaybackState::Stopped);
        }
        result
    }

    /// Stop playback and the rhythm; the queue and its position are kept
    pub fn stop(&mut self) {
        self.teardown();
        self.set_state(PlaybackState::Stopped);
    }

    /// Pause; `false` if nothing was playing
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        let Some(loaded) = &self.loaded else {
            return false;
        };
        lock_transport(&loaded.transport).pause();
        self.set_state(PlaybackState::Paused);
        true
    }

    /// Resume; `false` if nothing was paused
    pub fn resume(&mut self) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }
        let Some(loaded) = &self.loaded else {
            return false;
        };
        if !lock_transport(&loaded.transport).play() {
            warn!(title = %loaded.track.title, "Transport refused to resume");
            return false;
        }
        self.set_state(PlaybackState::Playing);
        true
    }

    /// Toggle between playing and paused; returns whether playing afterwards
    pub fn pause_resume(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing => {
                self.pause();
            }
            PlaybackState::Paused => {
                self.resume();
            }
            PlaybackState::Stopped => {}
        }
        self.state == PlaybackState::Playing
    }

    /// End the current track as unsuccessful and play the next one
    pub fn skip(&mut self) -> Result<()> {
        if self.cursor.is_none() {
            return Err(PlaybackError::QueueEmpty);
        }
        self.finish(false)
    }

    /// Play the previous track
    ///
    /// Unplayable entries on the way are dropped and the search keeps going
    /// backwards.
    pub fn previous(&mut self) -> Result<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(PlaybackError::QueueEmpty);
        };
        cursor.previous();
        self.teardown();
        self.start_recovering(Direction::Backward)
    }

    /// Restart the current track, or go to the previous one near its start
    pub fn rewind(&mut self) -> Result<()> {
        let threshold = self.config.rewind_threshold();
        if let Some(loaded) = &self.loaded {
            let mut transport = lock_transport(&loaded.transport);
            if transport.current_time() >= threshold {
                transport.set_current_time(Duration::ZERO);
                return Ok(());
            }
        }
        self.previous()
    }

    /// Jump to `position` in the queue and play it
    ///
    /// Returns `false` without touching playback when out of range.
    pub fn play_at(&mut self, position: Position) -> Result<bool> {
        let cursor = self.cursor.as_mut().ok_or(PlaybackError::QueueEmpty)?;
        if !cursor.set_position(position) {
            return Ok(false);
        }
        self.start()?;
        Ok(true)
    }

    // ========================================================================
    // Seeking
    // ========================================================================

    /// Seek within `[0, duration)`; anything else is ignored
    pub fn seek(&mut self, to: Duration) -> bool {
        let Some(loaded) = &self.loaded else {
            return false;
        };
        let mut transport = lock_transport(&loaded.transport);
        if to >= transport.duration() {
            return false;
        }
        transport.set_current_time(to);
        true
    }

    /// Seek ahead, or skip when that would pass the end of the track
    pub fn seek_forward(&mut self, interval: Duration) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(PlaybackError::NoTrackLoaded)?;
        {
            let mut transport = lock_transport(&loaded.transport);
            let target = transport.current_time().saturating_add(interval);
            if target < transport.duration() {
                transport.set_current_time(target);
                return Ok(());
            }
        }
        self.skip()
    }

    /// Seek back, or go to the previous track when that would pass the start
    pub fn seek_backward(&mut self, interval: Duration) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(PlaybackError::NoTrackLoaded)?;
        {
            let mut transport = lock_transport(&loaded.transport);
            if let Some(target) = transport.current_time().checked_sub(interval) {
                transport.set_current_time(target);
                return Ok(());
            }
        }
        self.previous()
    }

    /// [`PlaybackController::seek_forward`] by the configured seek interval
    pub fn skip_forward(&mut self) -> Result<()> {
        self.seek_forward(self.config.seek_interval())
    }

    /// [`PlaybackController::seek_backward`] by the configured seek interval
    pub fn skip_backward(&mut self) -> Result<()> {
        self.seek_backward(self.config.seek_interval())
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Apply a platform audio-session interruption
    pub fn interrupt(&mut self, interruption: Interruption) {
        match interruption {
            Interruption::Began => {
                debug!("Audio interruption began");
                self.pause();
                self.pending_events.push(PlaybackEvent::InterruptionBegan);
            }
            Interruption::Ended { should_resume } => {
                let resumed = should_resume && self.resume();
                debug!(resumed, "Audio interruption ended");
                self.pending_events
                    .push(PlaybackEvent::InterruptionEnded { resumed });
            }
        }
    }

    /// React to a transport report
    ///
    /// Reports from transports that are no longer current are ignored.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Result<()> {
        let current = self.loaded.as_ref().map(|l| l.generation);
        if current != Some(event.generation) {
            debug!(generation = event.generation, "Ignoring stale transport event");
            return Ok(());
        }

        match event.kind {
            TransportEventKind::Finished { successfully } => self.finish(successfully),
            TransportEventKind::DecodeError(message) => self.fail_current(message),
        }
    }

    /// Handle every transport report received so far
    pub fn poll_transport_events(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Ok(event) = self.transport_rx.try_recv() {
            self.handle_transport_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Wait for the next transport report
    ///
    /// Pass the result to [`PlaybackController::handle_transport_event`].
    pub async fn next_transport_event(&mut self) -> Option<TransportEvent> {
        self.transport_rx.recv().await
    }

    pub fn set_progress_observer(&self, observer: Option<ProgressObserver>) {
        self.rhythm.set_progress_observer(observer);
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether a track is loaded and not paused
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Track store index of the loaded track
    pub fn now_playing(&self) -> Option<Index> {
        self.loaded.as_ref().map(|l| l.index)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.loaded.as_ref().map(|l| &l.track)
    }

    pub fn current_time(&self) -> Option<Duration> {
        self.loaded
            .as_ref()
            .map(|l| lock_transport(&l.transport).current_time())
    }

    pub fn duration(&self) -> Option<Duration> {
        self.loaded
            .as_ref()
            .map(|l| lock_transport(&l.transport).duration())
    }

    /// Transport of the loaded track
    pub fn transport(&self) -> Option<SharedTransport> {
        self.loaded.as_ref().map(|l| l.transport.clone())
    }

    /// Rhythm engine driving the loaded transport
    pub fn rhythm(&self) -> &RhythmEngine {
        &self.rhythm
    }

    /// Seek and rewind settings
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn try_start(&mut self) -> Result<()> {
        let cursor = self.cursor.as_ref().ok_or(PlaybackError::QueueEmpty)?;
        let (position, index) = (cursor.position(), cursor.current());
        self.teardown();

        let track = self
            .tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
            .ok_or(PlaybackError::NoTrackLoaded)?;
        let interval = track
            .effective_interval()
            .map_err(|_| PlaybackError::InvalidPeriod(track.effective_period()))?;

        // The rhythm timer needs a runtime; check before a transport exists
        tokio::runtime::Handle::try_current().map_err(|_| PlaybackError::NoRuntime)?;

        self.generation += 1;
        let notifier = TransportNotifier::new(self.generation, self.transport_tx.clone());
        let transport: SharedTransport = Arc::new(Mutex::new(self.factory.open(&track, notifier)?));

        if let Err(e) = self.rhythm.start(track.rhythm, interval, transport.clone()) {
            lock_transport(&transport).stop();
            return Err(e);
        }
        if !lock_transport(&transport).play() {
            warn!(title = %track.title, "Transport refused to play");
        }

        info!(position, index, title = %track.title, detail = %track.detail(), "Track started");
        self.pending_events.push(PlaybackEvent::TrackStarted {
            position,
            index,
            title: track.title.clone(),
        });
        self.loaded = Some(Loaded {
            index,
            track,
            transport,
            generation: self.generation,
        });
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Start the current entry, dropping entries that cannot be played
    ///
    /// After a removal the cursor already sits on the following entry, so
    /// a backward search steps back once more.
    fn start_recovering(&mut self, direction: Direction) -> Result<()> {
        loop {
            match self.try_start() {
                Ok(()) => return Ok(()),
                Err(e) if e.is_unplayable() => {
                    let Some(cursor) = self.cursor.as_mut() else {
                        return Err(e);
                    };
                    let index = cursor.current();
                    warn!(index, error = %e, "Skipping unplayable track");
                    self.pending_events.push(PlaybackEvent::TrackFailed {
                        index,
                        message: e.to_string(),
                    });
                    if cursor.remove_current().is_none() {
                        self.exhausted();
                        return Ok(());
                    }
                    if direction == Direction::Backward {
                        cursor.previous();
                    }
                }
                Err(e) => {
                    self.set_state(PlaybackState::Stopped);
                    return Err(e);
                }
            }
        }
    }

    /// Close out the loaded track and advance to the next entry
    fn finish(&mut self, successfully: bool) -> Result<()> {
        if let Some(index) = self.teardown() {
            info!(index, successfully, "Track finished");
            self.pending_events.push(PlaybackEvent::TrackFinished {
                index,
                successfully,
            });
        }
        let Some(cursor) = self.cursor.as_mut() else {
            self.set_state(PlaybackState::Stopped);
            return Ok(());
        };
        cursor.next();
        self.start_recovering(Direction::Forward)
    }

    /// Drop the loaded track from the queue after a decode failure
    fn fail_current(&mut self, message: String) -> Result<()> {
        let Some(index) = self.teardown() else {
            return Ok(());
        };
        warn!(index, %message, "Decode error, removing track from queue");
        self.pending_events
            .push(PlaybackEvent::TrackFailed { index, message });

        let Some(cursor) = self.cursor.as_mut() else {
            self.set_state(PlaybackState::Stopped);
            return Ok(());
        };
        if cursor.remove_current().is_none() {
            self.exhausted();
            return Ok(());
        }
        self.start_recovering(Direction::Forward)
    }

    fn exhausted(&mut self) {
        warn!("No playable tracks left in queue");
        self.stop();
        self.pending_events.push(PlaybackEvent::QueueExhausted);
    }

    /// Invalidate the rhythm and close the transport; returns the track index
    fn teardown(&mut self) -> Option<Index> {
        self.rhythm.invalidate();
        let loaded = self.loaded.take()?;
        lock_transport(&loaded.transport).stop();
        Some(loaded.index)
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(PlaybackEvent::StateChanged { state });
        }
    }
}
