//! Print queue implementation.
//!
//! One worker task per run prints orders strictly in the given sequence.
//! A stop request interrupts the in-flight submission and the inter-job
//! delay through the shutdown channel.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::order::{Order, OrderStatusUpdater};
use crate::submit::{PrintJob, PrintProgress, PrintSubmitter};

use super::config::QueueConfig;
use super::status::{StatusBoard, StatusFeed};
use super::types::{PrintStatus, StatusSnapshot, FILE_NOT_FOUND_MESSAGE, PRINTING_MESSAGE};

/// The print queue - runs admitted orders through the print submitter.
pub struct PrintQueue {
    config: QueueConfig,
    submitter: Arc<dyn PrintSubmitter>,
    on_printed: Option<Arc<dyn OrderStatusUpdater>>,
    board: Arc<StatusBoard>,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PrintQueue {
    /// Create a new queue.
    ///
    /// `on_printed` receives `printed_status` for every order that printed.
    pub fn new(
        config: QueueConfig,
        submitter: Arc<dyn PrintSubmitter>,
        on_printed: Option<Arc<dyn OrderStatusUpdater>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            submitter,
            on_printed,
            board: Arc::new(StatusBoard::new()),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Subscribe to status snapshots.
    pub fn subscribe(&self) -> StatusFeed {
        self.board.feed()
    }

    /// Current status snapshot.
    pub fn status(&self) -> Arc<StatusSnapshot> {
        self.board.snapshot()
    }

    /// Start a run over `orders`, in order.
    ///
    /// Every order is WAITING when this returns. Returns `false` without
    /// touching anything if a run is already active.
    pub async fn start_printing(&self, orders: Vec<Order>, files: HashMap<String, PathBuf>) -> bool {
        let mut worker = self.worker.lock().await;

        if self.is_running() {
            warn!("Print queue already running, ignoring start request");
            return false;
        }

        // A stopped run may still be unwinding.
        if let Some(previous) = worker.take() {
            if let Err(e) = previous.await {
                if !e.is_cancelled() {
                    error!("Previous print queue worker failed: {}", e);
                }
            }
        }

        // Subscribe and seed before raising the flag, so a concurrent stop
        // either sees the flag and reaches the worker, or cancels the seeded
        // entries itself.
        let shutdown_rx = self.shutdown_tx.subscribe();
        let order_ids: Vec<String> = orders.iter().map(|o| o.order_id.clone()).collect();
        let run = self.board.begin_run(&order_ids);
        self.running.store(true, Ordering::SeqCst);

        info!(run, orders = orders.len(), "Starting print queue");
        metrics::QUEUE_RUNS_STARTED.inc();
        metrics::QUEUE_RUN_ACTIVE.set(1);

        let ctx = Worker {
            run,
            config: self.config.clone(),
            submitter: Arc::clone(&self.submitter),
            on_printed: self.on_printed.clone(),
            board: Arc::clone(&self.board),
            running: Arc::clone(&self.running),
        };

        *worker = Some(tokio::spawn(async move {
            ctx.process(orders, files, shutdown_rx).await;
        }));

        true
    }

    /// Stop the active run.
    ///
    /// Interrupts the in-flight submission and moves every WAITING or
    /// PRINTING order to CANCELLED. Calling it again has no further effect.
    pub fn stop_printing(&self) {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        if was_running {
            info!("Stopping print queue");
            let _ = self.shutdown_tx.send(());
        }

        let cancelled = self.board.cancel_active();
        if !cancelled.is_empty() {
            info!(count = cancelled.len(), "Cancelled queued orders");
            metrics::PRINT_JOBS_TOTAL
                .with_label_values(&["cancelled"])
                .inc_by(cancelled.len() as u64);
        }
        metrics::QUEUE_RUN_ACTIVE.set(0);
    }

    /// Drop completed, failed and cancelled entries from the status map.
    pub fn clear_completed_jobs(&self) -> usize {
        let removed = self.board.clear_terminal();
        debug!(removed, "Cleared finished print jobs");
        removed
    }
}

/// State moved into the worker task of one run.
struct Worker {
    run: u64,
    config: QueueConfig,
    submitter: Arc<dyn PrintSubmitter>,
    on_printed: Option<Arc<dyn OrderStatusUpdater>>,
    board: Arc<StatusBoard>,
    running: Arc<AtomicBool>,
}

impl Worker {
    async fn process(
        &self,
        orders: Vec<Order>,
        files: HashMap<String, PathBuf>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let total = orders.len();

        for (index, order) in orders.into_iter().enumerate() {
            if !self.running.load(Ordering::SeqCst) {
                info!(run = self.run, "Print queue stopped, halting");
                break;
            }

            debug!(
                run = self.run,
                order_id = %order.order_id,
                "Processing order {}/{}",
                index + 1,
                total
            );

            let file = files
                .get(&order.order_id)
                .filter(|path| path.exists())
                .cloned();

            let Some(file) = file else {
                warn!(order_id = %order.order_id, "File not found for order");
                self.finish(&order.order_id, PrintStatus::Failed, FILE_NOT_FOUND_MESSAGE);
                continue;
            };

            if !self.print(order, file, &mut shutdown_rx).await {
                break;
            }

            let delay = Duration::from_millis(self.config.inter_job_delay_ms);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_rx.recv() => {
                    info!(run = self.run, "Print queue stopped during inter-job delay");
                    break;
                }
            }
        }

        // Only clear the flag if no stop raced ahead of us.
        if self.running.swap(false, Ordering::SeqCst) {
            metrics::QUEUE_RUN_ACTIVE.set(0);
        }
        self.board.end_run(self.run);
        info!(run = self.run, "Print queue finished");
    }

    /// Print one order. Returns `false` if the run was stopped meanwhile.
    async fn print(
        &self,
        order: Order,
        file: PathBuf,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> bool {
        let order_id = order.order_id.clone();
        if !self
            .board
            .transition(self.run, &order_id, PrintStatus::Printing, PRINTING_MESSAGE)
        {
            // Cancelled between the flag check and here.
            return false;
        }
        info!(order_id = %order_id, document = %order.document_name, "Printing order");

        let (progress_tx, mut progress_rx) = mpsc::channel::<PrintProgress>(16);
        let board = Arc::clone(&self.board);
        let run = self.run;
        let forwarder = tokio::spawn(async move {
            while let Some(progress) = progress_rx.recv().await {
                debug!(order_id = %progress.order_id, stage = %progress.stage, "Print progress");
                board.set_progress(run, &progress.order_id, &progress.stage);
            }
        });

        let job = PrintJob { order, file };
        let result = tokio::select! {
            result = self.submitter.submit_with_progress(job, progress_tx) => Some(result),
            _ = shutdown_rx.recv() => None,
        };

        // The submitter owned the sender, so the forwarder drains and ends.
        if let Err(e) = forwarder.await {
            debug!("Progress forwarder ended abnormally: {}", e);
        }

        match result {
            Some(Ok(receipt)) => {
                self.finish(&order_id, PrintStatus::Completed, &receipt.message());
                self.notify_printed(&order_id);
                true
            }
            Some(Err(e)) => {
                self.finish(&order_id, PrintStatus::Failed, &e.to_string());
                true
            }
            None => {
                info!(order_id = %order_id, "Print submission interrupted by stop");
                false
            }
        }
    }

    fn finish(&self, order_id: &str, status: PrintStatus, message: &str) {
        if self.board.transition(self.run, order_id, status, message) {
            metrics::PRINT_JOBS_TOTAL
                .with_label_values(&[status.as_str()])
                .inc();
            info!(order_id, status = status.as_str(), message, "Print job finished");
        }
    }

    fn notify_printed(&self, order_id: &str) {
        let Some(hook) = self.on_printed.clone() else {
            return;
        };

        let order_id = order_id.to_string();
        let status = self.config.printed_status.clone();
        tokio::spawn(async move {
            match hook.update_order_status(&order_id, &status).await {
                Ok(()) => {
                    metrics::ORDER_STATUS_UPDATES
                        .with_label_values(&[status.as_str(), "success"])
                        .inc();
                }
                Err(e) => {
                    metrics::ORDER_STATUS_UPDATES
                        .with_label_values(&[status.as_str(), "failure"])
                        .inc();
                    error!(order_id = %order_id, "Failed to mark order as printed: {}", e);
                }
            }
        });
    }
}
