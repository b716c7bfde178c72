//! Core domain types for Rhythmic Player

mod rhythm;
mod session;
mod track;

pub use rhythm::{RateKind, RhythmKind};
pub use session::Session;
pub use track::{Track, DEFAULT_CATEGORY};

/// Zero-based position of a track in the track store
pub type Index = usize;

/// Zero-based offset into a queue snapshot
pub type Position = usize;
