//! Per-order download tracking.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::order::Order;

use super::downloader::DocumentDownloader;
use super::types::{DownloadSnapshot, DownloadState};

/// Owns the download state of every order and the tasks fetching them.
///
/// Readers get immutable snapshots through [`DownloadTracker::subscribe`];
/// every update replaces the snapshot.
#[derive(Clone)]
pub struct DownloadTracker {
    downloader: Arc<DocumentDownloader>,
    states: Arc<watch::Sender<Arc<DownloadSnapshot>>>,
    tasks: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl DownloadTracker {
    pub fn new(downloader: DocumentDownloader) -> Self {
        let (states, _) = watch::channel(Arc::new(DownloadSnapshot::default()));
        Self {
            downloader: Arc::new(downloader),
            states: Arc::new(states),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribe to download snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DownloadSnapshot>> {
        self.states.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<DownloadSnapshot> {
        self.states.borrow().clone()
    }

    /// Download state of one order.
    pub fn state(&self, order_id: &str) -> DownloadState {
        self.states
            .borrow()
            .states
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Materialized file of an order, if its download completed.
    pub fn downloaded_file(&self, order_id: &str) -> Option<PathBuf> {
        self.state(order_id).completed_path().cloned()
    }

    /// Materialized files by order id.
    pub fn downloaded_files(&self) -> HashMap<String, PathBuf> {
        self.snapshot().files()
    }

    /// Start downloading an order's document unless it is ineligible, in
    /// flight, completed or failed. Returns whether a download started.
    ///
    /// Failed downloads are only restarted by [`DownloadTracker::retry`].
    pub fn ensure_download(&self, order: &Order) -> bool {
        if !order.is_download_eligible() {
            return false;
        }

        match self.state(&order.order_id) {
            DownloadState::Idle => {
                self.start(order);
                true
            }
            _ => false,
        }
    }

    /// Restart a download that failed or never started.
    pub fn retry(&self, order: &Order) -> bool {
        if order.document_url.is_empty() {
            return false;
        }

        match self.state(&order.order_id) {
            DownloadState::Idle | DownloadState::Error { .. } => {
                info!(order_id = %order.order_id, "Retrying download");
                self.start(order);
                true
            }
            _ => false,
        }
    }

    /// Abort an in-flight download.
    pub fn cancel(&self, order_id: &str) -> bool {
        let handle = lock(&self.tasks).remove(order_id);
        let Some(handle) = handle else {
            return false;
        };

        handle.abort();
        if self.state(order_id).is_in_flight() {
            self.set_state(
                order_id,
                DownloadState::Error {
                    message: "Download cancelled".to_string(),
                },
            );
            metrics::DOWNLOADS_TOTAL
                .with_label_values(&["cancelled"])
                .inc();
            info!(order_id, "Download cancelled");
        }
        true
    }

    /// Drop state of orders no longer in the feed, aborting their downloads.
    pub fn retain(&self, order_ids: &[&str]) {
        let stale: Vec<String> = self
            .snapshot()
            .states
            .keys()
            .filter(|id| !order_ids.contains(&id.as_str()))
            .cloned()
            .collect();

        if stale.is_empty() {
            return;
        }

        {
            let mut tasks = lock(&self.tasks);
            for id in &stale {
                if let Some(handle) = tasks.remove(id) {
                    handle.abort();
                }
            }
        }

        self.states.send_modify(|snapshot| {
            let mut next = (**snapshot).clone();
            for id in &stale {
                next.states.remove(id);
            }
            next.version += 1;
            *snapshot = Arc::new(next);
        });
        debug!(count = stale.len(), "Dropped download state of departed orders");
    }

    fn start(&self, order: &Order) {
        let order_id = order.order_id.clone();
        let dest_name = local_file_name(&order.order_id, &order.document_name);

        // Mark in flight before spawning so concurrent callers see it.
        self.set_state(&order_id, DownloadState::Downloading { progress: 0.0 });
        info!(order_id = %order_id, url = %order.document_url, "Starting download");

        let mut stream = self.downloader.materialize(&order.document_url, &dest_name);
        let tracker = self.clone();
        let task_order_id = order_id.clone();

        // Held across the spawn so the task cannot clear its entry before
        // it is inserted.
        let mut tasks = lock(&self.tasks);
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            while let Some(state) = stream.next().await {
                let terminal = state.is_terminal();
                if terminal {
                    let result = match state {
                        DownloadState::Completed { .. } => "completed",
                        _ => "failed",
                    };
                    metrics::DOWNLOADS_TOTAL.with_label_values(&[result]).inc();
                    metrics::DOWNLOAD_DURATION
                        .with_label_values(&[result])
                        .observe(started.elapsed().as_secs_f64());
                }
                tracker.set_state(&task_order_id, state);
                if terminal {
                    break;
                }
            }
            // A retry may have replaced this task's entry already.
            let mut tasks = lock(&tracker.tasks);
            if tasks
                .get(&task_order_id)
                .is_some_and(|handle| handle.id() == tokio::task::id())
            {
                tasks.remove(&task_order_id);
            }
        });

        if let Some(previous) = tasks.insert(order_id, handle) {
            previous.abort();
        }
    }

    fn set_state(&self, order_id: &str, state: DownloadState) {
        self.states.send_modify(|snapshot| {
            let mut next = (**snapshot).clone();
            next.states.insert(order_id.to_string(), state);
            next.version += 1;
            *snapshot = Arc::new(next);
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Download task map lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Local file name for an order's document: `<order_id>_<name>`, with path
/// separators and control characters replaced.
pub fn local_file_name(order_id: &str, document_name: &str) -> String {
    let sanitize = |s: &str| -> String {
        s.chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect()
    };

    let name = sanitize(document_name.trim());
    let name = if name.is_empty() || name.chars().all(|c| c == '.') {
        "document.pdf".to_string()
    } else {
        name
    };

    format!("{}_{}", sanitize(order_id), name)
}
