//! Write-through worker.
//!
//! Mutations publish a numbered snapshot of the whole list and return
//! immediately. A background task writes the newest snapshot it has not yet
//! seen; snapshots published while a write is in flight collapse into one
//! follow-up write, so the last mutation is always the last one written.
//! Each attempt, successful or not, is acknowledged by generation so callers
//! can [`flush`](WriteThrough::flush) before exiting.

use crate::gateway::Gateway;
use crate::model::Item;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Snapshot {
    generation: u64,
    items: Arc<[Item]>,
}

#[derive(Debug, Default)]
struct WriteStats {
    attempted: AtomicU64,
    failed: AtomicU64,
    last_error: Mutex<Option<String>>,
}

/// Outcome of every write attempted during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub attempted: u64,
    pub failed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl WriteReport {
    /// True when no write failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Handle to the background writer for one storage key.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct WriteThrough {
    snapshots: watch::Sender<Snapshot>,
    acked: watch::Receiver<u64>,
    generation: u64,
    stats: Arc<WriteStats>,
    task: JoinHandle<()>,
}

impl WriteThrough {
    /// Spawn the worker writing to `key` on `gateway`.
    pub fn spawn(gateway: Arc<dyn Gateway>, key: impl Into<String>) -> Self {
        let (snapshots, snapshot_rx) = watch::channel(Snapshot {
            generation: 0,
            items: Arc::from(Vec::new()),
        });
        let (acked_tx, acked) = watch::channel(0_u64);
        let stats = Arc::new(WriteStats::default());

        let task = tokio::spawn(run_worker(
            gateway,
            key.into(),
            snapshot_rx,
            acked_tx,
            Arc::clone(&stats),
        ));

        Self {
            snapshots,
            acked,
            generation: 0,
            stats,
            task,
        }
    }

    /// Queue `items` to be written. Never waits for the write.
    pub fn publish(&mut self, items: &[Item]) -> u64 {
        self.generation += 1;
        self.snapshots.send_replace(Snapshot {
            generation: self.generation,
            items: Arc::from(items),
        });
        self.generation
    }

    /// Generation of the most recently published snapshot.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until the latest published snapshot has been attempted.
    pub async fn flush(&self) {
        let target = self.generation;
        if target == 0 {
            return;
        }
        let mut acked = self.acked.clone();
        if acked.wait_for(|done| *done >= target).await.is_err() {
            warn!(target, "write-through worker exited before flushing");
        }
    }

    /// Counters so far.
    #[must_use]
    pub fn report(&self) -> WriteReport {
        WriteReport {
            attempted: self.stats.attempted.load(Ordering::SeqCst),
            failed: self.stats.failed.load(Ordering::SeqCst),
            last_error: self
                .stats
                .last_error
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
        }
    }

    /// Flush, stop the worker, and return the final counters.
    pub async fn close(self) -> WriteReport {
        self.flush().await;
        let report = self.report();
        let Self {
            snapshots, task, ..
        } = self;
        drop(snapshots);
        if let Err(err) = task.await {
            warn!(error = %err, "write-through worker panicked");
        }
        report
    }
}

async fn run_worker(
    gateway: Arc<dyn Gateway>,
    key: String,
    mut snapshots: watch::Receiver<Snapshot>,
    acked: watch::Sender<u64>,
    stats: Arc<WriteStats>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        stats.attempted.fetch_add(1, Ordering::SeqCst);

        match gateway.set(&key, &snapshot.items).await {
            Ok(()) => debug!(
                key = %key,
                generation = snapshot.generation,
                items = snapshot.items.len(),
                "persisted item list"
            ),
            Err(err) => {
                stats.failed.fetch_add(1, Ordering::SeqCst);
                if let Ok(mut last) = stats.last_error.lock() {
                    *last = Some(err.to_string());
                }
                warn!(
                    key = %key,
                    generation = snapshot.generation,
                    code = %err.code(),
                    error = %err,
                    "failed to persist item list; in-memory list stays authoritative"
                );
            }
        }

        acked.send_replace(snapshot.generation);
    }
    debug!(key = %key, "write-through worker stopped");
}
