//! Rhythmic Player Core
//!
//! Platform-agnostic domain types, traits, and error handling for Rhythmic Player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Session`, `RhythmKind`, `RateKind`
//! - **Collaborator Traits**: `Persistence`, `TempoDetector`
//! - **Error Handling**: Unified `RhythmicError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use rhythmic_core::types::{RateKind, RhythmKind, Session, Track};
//! use std::path::PathBuf;
//!
//! let track = Track::new("Rain", 0.5, PathBuf::from("rain.mp3"))
//!     .with_rhythm(RhythmKind::Crosspan)
//!     .with_rate(RateKind::Double);
//!
//! assert_eq!(track.effective_period(), 0.25);
//! assert_eq!(track.detail(), "Crosspan : 2x : 0.250");
//!
//! let session = Session::new("Evening", vec![track]);
//! assert_eq!(session.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, RhythmicError};
pub use storage::Persistence;
pub use traits::TempoDetector;

pub use types::{Index, Position, RateKind, RhythmKind, Session, Track, DEFAULT_CATEGORY};
