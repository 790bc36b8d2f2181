//! Background worker that keeps the record snapshot in sync with its file.
//!
//! The worker polls the file's modification time. A change schedules a debounced
//! reload, so a file being rewritten in several steps is read once it settles. A reload
//! that fails leaves the previous snapshot in place.

use crate::debounce::Debouncer;
use crate::error::Result;
use crate::snapshot;
use crate::state::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// State shared between the server and the worker.
pub type SharedState = Arc<RwLock<AppState>>;

/// Load the snapshot at `path` into `state`, returning the new generation.
///
/// The file is read without holding the lock.
pub async fn reload(state: &SharedState, path: &Path) -> Result<u64> {
    let records = snapshot::load(path).await?;
    Ok(state.write().await.replace_snapshot(records))
}

pub struct SnapshotWorker {
    state: SharedState,
    path: PathBuf,
    poll_interval: Duration,
    debouncer: Debouncer,
    last_seen: Option<SystemTime>,
}

impl SnapshotWorker {
    pub fn new(state: SharedState, path: PathBuf, poll_interval: Duration, debounce: Duration) -> Self {
        Self {
            state,
            path,
            poll_interval,
            debouncer: Debouncer::new(debounce),
            last_seen: None,
        }
    }

    /// Treat the file as already loaded at `modified`.
    #[must_use]
    pub const fn with_last_seen(mut self, modified: SystemTime) -> Self {
        self.last_seen = Some(modified);
        self
    }

    /// Poll until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::debug!("Snapshot worker stopped");
                    self.debouncer.cancel();
                    return;
                }
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }

    /// Check the file once; returns whether a reload was scheduled.
    pub async fn poll_once(&mut self) -> bool {
        let modified = match snapshot::modified(&self.path).await {
            Ok(modified) => modified,
            Err(e) => {
                tracing::trace!("Snapshot not readable: {:#}", e);
                return false;
            }
        };
        if self.last_seen == Some(modified) {
            return false;
        }
        self.last_seen = Some(modified);

        tracing::debug!(path = %self.path.display(), "Snapshot changed, scheduling reload");
        let state = Arc::clone(&self.state);
        let path = self.path.clone();
        self.debouncer.call(move || async move {
            if let Err(e) = reload(&state, &path).await {
                tracing::warn!("Keeping previous snapshot: {:#}", e);
            }
        });
        true
    }
}

/// Spawn the worker as a tokio task.
pub fn spawn_snapshot_worker(
    worker: SnapshotWorker,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(worker.run(shutdown))
}
