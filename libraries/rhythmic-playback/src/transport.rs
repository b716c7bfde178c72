//! Platform audio transport seam
//!
//! The controller never decodes audio. A platform supplies a
//! [`TransportFactory`] that opens a playable [`AudioTransport`] per track
//! and reports completion or decode failures through a
//! [`TransportNotifier`].

use crate::error::Result;
use rhythmic_core::Track;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

/// Playable object for a single track
///
/// Pan is in [-1, 1], volume in [0, 1].
pub trait AudioTransport: Send {
    /// Begin or resume output; `false` if the platform refused
    fn play(&mut self) -> bool;

    fn pause(&mut self);

    /// Stop output; the transport is not reused afterwards
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    fn current_time(&self) -> Duration;

    fn set_current_time(&mut self, time: Duration);

    fn duration(&self) -> Duration;

    fn pan(&self) -> f32;

    fn set_pan(&mut self, pan: f32);

    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);
}

/// Transport shared between the controller and the rhythm driver
pub type SharedTransport = Arc<Mutex<Box<dyn AudioTransport>>>;

pub(crate) fn lock_transport(
    transport: &SharedTransport,
) -> MutexGuard<'_, Box<dyn AudioTransport>> {
    transport.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Opens transports for tracks
pub trait TransportFactory: Send + Sync {
    /// Build a ready-to-play transport for `track`
    ///
    /// # Errors
    /// Returns an error when the file is missing or cannot be decoded
    fn open(&self, track: &Track, notifier: TransportNotifier) -> Result<Box<dyn AudioTransport>>;
}

/// What a transport reported
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEventKind {
    /// Output reached the end of the track
    Finished { successfully: bool },

    /// Decoding failed mid-playback
    DecodeError(String),
}

/// Report from the transport opened under `generation`
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub generation: u64,
    pub kind: TransportEventKind,
}

/// Callback handle given to each opened transport
///
/// Events are tagged with the generation of the transport they belong to,
/// so reports from a replaced transport can be told apart and dropped.
#[derive(Debug, Clone)]
pub struct TransportNotifier {
    generation: u64,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportNotifier {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report natural completion
    pub fn finished(&self, successfully: bool) {
        self.send(TransportEventKind::Finished { successfully });
    }

    /// Report a decode failure
    pub fn decode_error(&self, message: impl Into<String>) {
        self.send(TransportEventKind::DecodeError(message.into()));
    }

    fn send(&self, kind: TransportEventKind) {
        // The controller may already be gone
        let _ = self.tx.send(TransportEvent {
            generation: self.generation,
            kind,
        });
    }
}
