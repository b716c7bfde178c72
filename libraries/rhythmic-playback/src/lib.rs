//! Rhythmic Player - Playback Management
//!
//! Platform-agnostic playback for Rhythmic Player.
//!
//! This crate provides:
//! - Selection queue (toggle, safe select, bulk append, observers)
//! - Queue cursor with circular next/previous navigation
//! - Rhythm engine (Bilateral, Crosspan, Synthesis, Stitch) on a cancellable
//!   periodic driver
//! - Playback controller (start/stop/pause/skip/previous/seek, completion and
//!   decode-error recovery, interruptions)
//! - Configuration loading
//! - Library composition over the track and session stores
//!
//! # Architecture
//!
//! `rhythmic-playback` never decodes audio. A platform implements
//! [`TransportFactory`] and [`AudioTransport`]; the controller only needs
//! pan/volume control, seeking and completion callbacks.
//!
//! # Example: Navigating a queue
//!
//! ```rust
//! use rhythmic_playback::{QueueCursor, SelectionQueue};
//!
//! let mut selection = SelectionQueue::new();
//! selection.append_all([0, 1, 2]);
//!
//! let mut cursor = QueueCursor::from_selection(&selection).unwrap();
//! assert_eq!(cursor.next(), 1);
//! assert_eq!(cursor.next(), 2);
//! assert_eq!(cursor.next(), 0);
//! assert_eq!(cursor.previous(), 2);
//! ```
//!
//! # Example: Rhythm steps
//!
//! ```rust
//! use rhythmic_core::RhythmKind;
//! use rhythmic_playback::{RhythmChange, RhythmConfig, RhythmState};
//!
//! let mut bilateral = RhythmState::new(RhythmKind::Bilateral, RhythmConfig::default());
//! assert_eq!(bilateral.activate(), RhythmChange::Pan(-1.0));
//! assert_eq!(bilateral.tick(), Some(RhythmChange::Pan(1.0)));
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use rhythmic_core::Track;
//! use rhythmic_playback::{
//!     AudioTransport, Library, PlayerConfig, Result, TransportFactory, TransportNotifier,
//! };
//! use std::sync::Arc;
//!
//! struct Speakers;
//!
//! impl TransportFactory for Speakers {
//!     fn open(&self, track: &Track, notifier: TransportNotifier) -> Result<Box<dyn AudioTransport>> {
//!         // Decode `track.file` and call `notifier.finished(true)` at the end
//!         # let _ = (track, notifier);
//!         unimplemented!()
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let config = PlayerConfig::load()?;
//! let mut library = Library::open_json(&config, Arc::new(Speakers), Vec::new()).await?;
//! library.play_all()?;
//!
//! while let Some(event) = library.playback_mut().next_transport_event().await {
//!     library.playback_mut().handle_transport_event(event)?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod cursor;
mod error;
mod events;
mod library;
mod rhythm;
mod selection;
mod shuffle;
mod transport;
pub mod types;

// Public exports
pub use config::{PlayerConfig, StorageSettings, ENV_PREFIX};
pub use controller::PlaybackController;
pub use cursor::QueueCursor;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use library::Library;
pub use rhythm::{ProgressObserver, RhythmChange, RhythmEngine, RhythmState};
pub use selection::{Inspect, SelectionObserver, SelectionQueue};
pub use shuffle::{shuffled_indices, shuffled_indices_with};
pub use transport::{
    AudioTransport, SharedTransport, TransportEvent, TransportEventKind, TransportFactory,
    TransportNotifier,
};
pub use types::{Interruption, PlaybackConfig, PlaybackState, RhythmConfig, StitchMode};
