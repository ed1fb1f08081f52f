//! Print shop workflow.
//!
//! Consumes the order feed and drives everything that happens without an
//! operator:
//! - paid `SUBMITTED` orders are admitted by requesting `QUEUED`
//! - documents of paid `QUEUED` orders are downloaded as soon as possible
//! - [`PrintShop::start_printing`] hands every ready order to the queue

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::download::DownloadTracker;
use crate::metrics;
use crate::order::{status, Order, OrderFeed, OrderStatusUpdater};
use crate::printer::PrinterDirectory;
use crate::queue::PrintQueue;
use crate::settings::{PrinterAssignment, SettingsError, SettingsStore};

/// Latest order collection, split by print state. Both lists keep feed
/// order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Incremented on every feed update.
    pub version: u64,
    pub pending: Vec<Order>,
    pub printed: Vec<Order>,
}

impl OrderBook {
    pub fn find(&self, order_id: &str) -> Option<&Order> {
        self.pending
            .iter()
            .chain(self.printed.iter())
            .find(|order| order.order_id == order_id)
    }
}

/// Printers known to the system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterList {
    pub printers: Vec<String>,
    pub default_printer: Option<String>,
}

/// The print shop - glues the order store, downloads and the print queue.
pub struct PrintShop {
    updater: Arc<dyn OrderStatusUpdater>,
    directory: Arc<dyn PrinterDirectory>,
    downloads: DownloadTracker,
    queue: Arc<PrintQueue>,
    assignment: Arc<RwLock<PrinterAssignment>>,
    settings: SettingsStore,

    orders: watch::Sender<Arc<OrderBook>>,
    /// Orders we already asked the store to admit.
    admitting: Mutex<HashSet<String>>,
}

impl PrintShop {
    /// Create a new shop.
    ///
    /// `assignment` must be the same lock the queue's submitter reads.
    pub fn new(
        updater: Arc<dyn OrderStatusUpdater>,
        directory: Arc<dyn PrinterDirectory>,
        downloads: DownloadTracker,
        queue: Arc<PrintQueue>,
        assignment: Arc<RwLock<PrinterAssignment>>,
        settings: SettingsStore,
    ) -> Self {
        let (orders, _) = watch::channel(Arc::new(OrderBook::default()));

        Self {
            updater,
            directory,
            downloads,
            queue,
            assignment,
            settings,
            orders,
            admitting: Mutex::new(HashSet::new()),
        }
    }

    pub fn queue(&self) -> &Arc<PrintQueue> {
        &self.queue
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    /// Latest order book.
    pub fn orders(&self) -> Arc<OrderBook> {
        self.orders.borrow().clone()
    }

    /// Subscribe to order book updates.
    pub fn subscribe_orders(&self) -> watch::Receiver<Arc<OrderBook>> {
        self.orders.subscribe()
    }

    /// Consume `feed` until `shutdown` fires or the feed ends.
    pub async fn run(&self, feed: Arc<dyn OrderFeed>, mut shutdown: broadcast::Receiver<()>) {
        info!("Starting order feed loop");
        let mut snapshots = feed.subscribe();

        loop {
            tokio::select! {
                item = snapshots.next() => match item {
                    Some(Ok(orders)) => self.handle_orders(orders),
                    Some(Err(e)) => {
                        metrics::ORDER_FEED_ERRORS.inc();
                        warn!("Order feed error: {}", e);
                    }
                    None => {
                        warn!("Order feed ended");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    info!("Order feed loop shutting down");
                    break;
                }
            }
        }
    }

    /// Apply one snapshot of the order collection.
    pub fn handle_orders(&self, orders: Vec<Order>) {
        let (printed, pending): (Vec<Order>, Vec<Order>) =
            orders.into_iter().partition(Order::is_printed);

        debug!(
            pending = pending.len(),
            printed = printed.len(),
            "Order collection updated"
        );

        self.admit(&pending);

        let mut started = 0;
        for order in &pending {
            if self.downloads.ensure_download(order) {
                started += 1;
            }
        }
        if started > 0 {
            info!(count = started, "Started document downloads");
        }

        let known: Vec<&str> = pending
            .iter()
            .chain(printed.iter())
            .map(|order| order.order_id.as_str())
            .collect();
        self.downloads.retain(&known);

        self.orders.send_modify(|book| {
            *book = Arc::new(OrderBook {
                version: book.version + 1,
                pending,
                printed,
            });
        });
    }

    /// Request `QUEUED` for paid `SUBMITTED` orders, once per order.
    fn admit(&self, pending: &[Order]) {
        let to_admit: Vec<String> = {
            let mut admitting = self
                .admitting
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            // Forget orders that left SUBMITTED so a later bounce is retried.
            admitting.retain(|id| {
                pending
                    .iter()
                    .any(|o| &o.order_id == id && o.order_status == status::SUBMITTED)
            });

            pending
                .iter()
                .filter(|order| order.is_ready_to_queue())
                .filter(|order| admitting.insert(order.order_id.clone()))
                .map(|order| order.order_id.clone())
                .collect()
        };

        for order_id in to_admit {
            let updater = Arc::clone(&self.updater);
            tokio::spawn(async move {
                info!(order_id = %order_id, "Admitting paid order to queue");
                let result = updater.update_order_status(&order_id, status::QUEUED).await;
                let label = if result.is_ok() { "success" } else { "failure" };
                metrics::ORDER_STATUS_UPDATES
                    .with_label_values(&[status::QUEUED, label])
                    .inc();
                if let Err(e) = result {
                    error!(order_id = %order_id, "Failed to admit order: {}", e);
                }
            });
        }
    }

    /// Pending orders whose documents are downloaded, in feed order.
    pub fn ready_orders(&self) -> Vec<Order> {
        let files = self.downloads.downloaded_files();
        self.orders()
            .pending
            .iter()
            .filter(|order| order.is_download_eligible() && files.contains_key(&order.order_id))
            .cloned()
            .collect()
    }

    /// Print every ready order.
    ///
    /// Returns `false` if printers are not configured, nothing is ready or a
    /// run is already active.
    pub async fn start_printing(&self) -> bool {
        if !self.assignment.read().await.is_configured() {
            warn!("Printer settings not configured, refusing to start printing");
            return false;
        }

        let ready = self.ready_orders();
        if ready.is_empty() {
            info!("No orders ready to print");
            return false;
        }

        let files = self.downloads.downloaded_files();
        self.queue.start_printing(ready, files).await
    }

    pub fn stop_printing(&self) {
        self.queue.stop_printing();
    }

    pub fn clear_completed_jobs(&self) -> usize {
        self.queue.clear_completed_jobs()
    }

    /// Current printer assignment.
    pub async fn printer_assignment(&self) -> PrinterAssignment {
        self.assignment.read().await.clone()
    }

    /// Persist a new printer assignment and use it for later jobs.
    pub async fn update_printer_assignment(
        &self,
        assignment: PrinterAssignment,
    ) -> Result<(), SettingsError> {
        self.settings.save(&assignment).await?;
        *self.assignment.write().await = assignment;
        info!("Printer assignment updated");
        Ok(())
    }

    /// Printers known to the system.
    pub async fn printers(&self) -> PrinterList {
        let directory = Arc::clone(&self.directory);
        tokio::task::spawn_blocking(move || PrinterList {
            printers: directory.list_printers(),
            default_printer: directory.default_printer(),
        })
        .await
        .unwrap_or_else(|e| {
            error!("Printer enumeration failed: {}", e);
            PrinterList::default()
        })
    }

    /// Restart a failed download. Returns `false` for unknown orders or
    /// downloads that did not fail.
    pub fn retry_download(&self, order_id: &str) -> bool {
        match self.orders().find(order_id) {
            Some(order) => self.downloads.retry(order),
            None => false,
        }
    }

    /// Abort an in-flight download.
    pub fn cancel_download(&self, order_id: &str) -> bool {
        self.downloads.cancel(order_id)
    }
}
