//! Background writer that applies one store's saves in order

use rhythmic_core::{Persistence, Result, RhythmicError, Session, Track};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[derive(Debug)]
enum WriteCommand {
    Tracks(Vec<Track>),
    Sessions(Vec<Session>),
    Flush(oneshot::Sender<()>),
}

/// Handle to a store's persistence task
///
/// Saves are queued and executed sequentially in submission order, so two
/// writes of the same collection never interleave. The task exits once
/// every handle has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct PersistWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl PersistWriter {
    /// Spawn the writer task on the current tokio runtime
    ///
    /// # Errors
    /// Returns a storage error when called outside a tokio runtime
    pub fn spawn(persistence: Arc<dyn Persistence>) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            RhythmicError::storage(format!("persistence writer needs a tokio runtime: {e}"))
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run(persistence, rx));
        Ok(Self { tx })
    }

    pub(crate) fn save_tracks(&self, tracks: Vec<Track>) {
        self.submit(WriteCommand::Tracks(tracks));
    }

    pub(crate) fn save_sessions(&self, sessions: Vec<Session>) {
        self.submit(WriteCommand::Sessions(sessions));
    }

    /// Wait until every previously queued save has been attempted
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    fn submit(&self, command: WriteCommand) {
        if self.tx.send(command).is_err() {
            warn!("Persistence writer has stopped, dropping save");
        }
    }
}

async fn run(persistence: Arc<dyn Persistence>, mut rx: mpsc::UnboundedReceiver<WriteCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Tracks(tracks) => {
                match persistence.save_tracks(&tracks).await {
                    Ok(()) => debug!(count = tracks.len(), "Saved tracks"),
                    Err(e) => warn!(error = %e, "Failed to save tracks"),
                }
            }
            WriteCommand::Sessions(sessions) => {
                match persistence.save_sessions(&sessions).await {
                    Ok(()) => debug!(count = sessions.len(), "Saved sessions"),
                    Err(e) => warn!(error = %e, "Failed to save sessions"),
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Persistence writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryPersistence;

    #[test]
    fn test_spawn_requires_runtime() {
        let persistence = Arc::new(InMemoryPersistence::new());
        assert!(PersistWriter::spawn(persistence).is_err());
    }

    #[tokio::test]
    async fn test_saves_apply_in_order() {
        let persistence = Arc::new(InMemoryPersistence::new());
        let writer = PersistWriter::spawn(persistence.clone()).unwrap();

        writer.save_tracks(vec![Track::new("A", 1.0, "a.mp3")]);
        writer.save_tracks(vec![
            Track::new("A", 1.0, "a.mp3"),
            Track::new("B", 1.0, "b.mp3"),
        ]);
        writer.flush().await;

        assert_eq!(persistence.track_saves(), 2);
        assert_eq!(persistence.saved_tracks().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let persistence = Arc::new(InMemoryPersistence::new());
        persistence.set_failing(true);
        let writer = PersistWriter::spawn(persistence.clone()).unwrap();

        writer.save_sessions(vec![Session::new("Focus", vec![])]);
        writer.flush().await;

        // The writer keeps running after a failed save
        persistence.set_failing(false);
        writer.save_sessions(vec![Session::new("Sleep", vec![])]);
        writer.flush().await;

        assert_eq!(persistence.saved_sessions().unwrap()[0].title, "Sleep");
    }
}
