//! Status board (single writer) and status feed (many readers).

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;

use super::types::{PrintJobStatus, PrintStatus, StatusSnapshot, CANCELLED_MESSAGE, WAITING_MESSAGE};

/// Writer side of the queue status.
///
/// Every change publishes a new immutable [`StatusSnapshot`]; readers never
/// see a partially updated map.
#[derive(Debug)]
pub struct StatusBoard {
    tx: watch::Sender<Arc<StatusSnapshot>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(StatusSnapshot::default()));
        Self { tx }
    }

    /// A read-only feed of this board.
    pub fn feed(&self) -> StatusFeed {
        StatusFeed {
            rx: self.tx.subscribe(),
        }
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.tx.borrow().clone()
    }

    /// Apply `f` to a copy of the current snapshot and publish it if `f`
    /// reports a change.
    fn publish<R: Default>(&self, f: impl FnOnce(&mut StatusSnapshot) -> (bool, R)) -> R {
        let mut result = None;
        self.tx.send_if_modified(|current| {
            let mut next = (**current).clone();
            let (changed, r) = f(&mut next);
            result = Some(r);
            if changed {
                next.version += 1;
                *current = Arc::new(next);
            }
            changed
        });
        result.unwrap_or_default()
    }

    /// Open a new run: seed every order as WAITING in one update and mark
    /// the queue running. Returns the new run id.
    pub fn begin_run(&self, order_ids: &[String]) -> u64 {
        self.publish(|snapshot| {
            snapshot.run += 1;
            snapshot.running = true;
            let run = snapshot.run;
            for id in order_ids {
                snapshot.jobs.insert(
                    id.clone(),
                    PrintJobStatus::new(id, PrintStatus::Waiting, WAITING_MESSAGE, run),
                );
            }
            (true, run)
        })
    }

    /// Mark `run` finished. Ignored if a newer run started.
    pub fn end_run(&self, run: u64) {
        self.publish(|snapshot| {
            if snapshot.run == run && snapshot.running {
                snapshot.running = false;
                (true, ())
            } else {
                (false, ())
            }
        })
    }

    /// Move an order of `run` to `status`.
    ///
    /// Rejected (returns `false`) when the run is stale, the entry is
    /// missing or the transition is illegal; terminal entries never change.
    pub fn transition(&self, run: u64, order_id: &str, status: PrintStatus, message: &str) -> bool {
        let applied = self.publish(|snapshot| {
            if snapshot.run != run {
                return (false, false);
            }
            let Some(entry) = snapshot.jobs.get_mut(order_id) else {
                return (false, false);
            };
            if entry.run != run || !entry.status.can_transition_to(status) {
                return (false, false);
            }

            entry.status = status;
            entry.message = message.to_string();
            if status != PrintStatus::Printing {
                entry.progress.clear();
            }
            entry.updated_at = Utc::now();
            (true, true)
        });

        if !applied {
            debug!(order_id, run, status = status.as_str(), "Ignored stale status update");
        }
        applied
    }

    /// Record a submission stage. Only applies while the order is printing.
    pub fn set_progress(&self, run: u64, order_id: &str, progress: &str) -> bool {
        self.publish(|snapshot| {
            if snapshot.run != run {
                return (false, false);
            }
            match snapshot.jobs.get_mut(order_id) {
                Some(entry) if entry.run == run && entry.status == PrintStatus::Printing => {
                    entry.progress = progress.to_string();
                    entry.updated_at = Utc::now();
                    (true, true)
                }
                _ => (false, false),
            }
        })
    }

    /// Cancel every WAITING or PRINTING entry and mark the queue stopped.
    /// Returns the cancelled order ids.
    pub fn cancel_active(&self) -> Vec<String> {
        self.publish(|snapshot| {
            let now = Utc::now();
            let mut cancelled = Vec::new();
            for entry in snapshot.jobs.values_mut() {
                if entry.status.is_active() {
                    entry.status = PrintStatus::Cancelled;
                    entry.message = CANCELLED_MESSAGE.to_string();
                    entry.progress.clear();
                    entry.updated_at = now;
                    cancelled.push(entry.order_id.clone());
                }
            }
            let changed = !cancelled.is_empty() || snapshot.running;
            snapshot.running = false;
            (changed, cancelled)
        })
    }

    /// Remove completed, failed and cancelled entries. Returns how many
    /// were removed.
    pub fn clear_terminal(&self) -> usize {
        self.publish(|snapshot| {
            let before = snapshot.jobs.len();
            snapshot.jobs.retain(|_, entry| entry.status.is_active());
            let removed = before - snapshot.jobs.len();
            (removed > 0, removed)
        })
    }
}

/// Read-only, cloneable view of a [`StatusBoard`].
#[derive(Debug, Clone)]
pub struct StatusFeed {
    rx: watch::Receiver<Arc<StatusSnapshot>>,
}

impl StatusFeed {
    /// Latest snapshot.
    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the board is gone.
    pub async fn changed(&mut self) -> Option<Arc<StatusSnapshot>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until `predicate` holds for a snapshot and return it.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&StatusSnapshot) -> bool,
    ) -> Option<Arc<StatusSnapshot>> {
        let snapshot = self.rx.wait_for(|s| predicate(s)).await.ok()?;
        Some(snapshot.clone())
    }
}
