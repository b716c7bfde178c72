//! Rhythmic Player Storage
//!
//! In-memory track and session stores backed by a durable `Persistence`
//! collaborator.
//!
//! # Architecture
//!
//! - **Memory is authoritative**: every mutation is applied in memory first
//!   and readers never observe a partial update.
//! - **Fire-and-forget persistence**: the full collection is queued to a
//!   per-store background task after every mutation. Writes are applied in
//!   order, one at a time, and failures are logged rather than surfaced.
//! - **Soft lookups**: out-of-range indices yield `None`, never an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use rhythmic_core::Track;
//! use rhythmic_storage::{JsonFilePersistence, TrackStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> rhythmic_core::Result<()> {
//! let persistence = Arc::new(JsonFilePersistence::new("./data"));
//! let defaults = vec![Track::new("Ocean", 0.8, "ocean.mp3")];
//!
//! let mut store = TrackStore::load(persistence, defaults).await?;
//! store.append(Track::new("Rain", 0.5, "rain.mp3"))?;
//! store.flush().await;
//! # Ok(())
//! # }
//! ```

mod json;
mod memory;
mod persist;
mod sessions;
mod sort;
mod tracks;

pub use json::{JsonFilePersistence, SESSIONS_FILE, TRACKS_FILE};
pub use memory::InMemoryPersistence;
pub use persist::PersistWriter;
pub use sessions::{SessionStore, SharedSessionStore};
pub use sort::{SortedView, TrackSort};
pub use tracks::{SharedTrackStore, TrackStore};
