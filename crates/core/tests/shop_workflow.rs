//! Print shop workflow integration tests.
//!
//! Feed -> admission -> download -> queue -> printed, with a mock order
//! store and submitter and a real HTTP document server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::{broadcast, RwLock};

use autoprint_core::{
    config::DownloadConfig,
    order::{status, OrderFeed},
    testing::{fixtures, MockOrderStore, MockPrinterDirectory, MockSubmitter},
    DocumentDownloader, DownloadState, DownloadTracker, PrintQueue, PrintShop, PrintStatus,
    PrinterAssignment, QueueConfig, SettingsStore,
};

struct TestHarness {
    shop: Arc<PrintShop>,
    store: Arc<MockOrderStore>,
    submitter: Arc<MockSubmitter>,
    shutdown_tx: broadcast::Sender<()>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(MockOrderStore::new());
        let submitter = Arc::new(MockSubmitter::new());
        let directory = Arc::new(MockPrinterDirectory::with_printers(
            &["Office_Laser", "Photo_Color"],
            Some("Office_Laser"),
        ));

        let downloader = DocumentDownloader::new(&DownloadConfig {
            dir: temp_dir.path().join("downloads"),
            timeout_secs: 10,
        })
        .expect("Failed to create downloader");

        let queue = Arc::new(PrintQueue::new(
            QueueConfig {
                inter_job_delay_ms: 10,
                ..Default::default()
            },
            submitter.clone(),
            Some(store.clone()),
        ));

        let shop = Arc::new(PrintShop::new(
            store.clone(),
            directory,
            DownloadTracker::new(downloader),
            queue,
            Arc::new(RwLock::new(PrinterAssignment::default())),
            SettingsStore::new(temp_dir.path().join("settings.json")),
        ));

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            shop,
            store,
            submitter,
            shutdown_tx,
            temp_dir,
        }
    }

    fn start_feed_loop(&self) {
        let shop = Arc::clone(&self.shop);
        let feed: Arc<dyn OrderFeed> = self.store.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            shop.run(feed, shutdown_rx).await;
        });
    }

    async fn configure_printers(&self) {
        self.shop
            .update_printer_assignment(PrinterAssignment {
                fallback_printer: "Office_Laser".to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to save assignment");
    }

    async fn has_update(&self, order_id: &str, order_status: &str) -> bool {
        self.store
            .recorded_updates()
            .await
            .iter()
            .any(|u| u.order_id == order_id && u.status == order_status)
    }
}

#[tokio::test]
async fn test_paid_order_flows_from_submitted_to_printed() {
    let harness = TestHarness::new();
    let docs = fixtures::serve_documents(vec![("/o1.pdf", b"%PDF-1.5 test".to_vec())]).await;

    harness.store.set_orders(vec![
        fixtures::submitted_order("o1", &format!("{}/o1.pdf", docs)),
        fixtures::order("old", status::PRINTED),
    ]);
    harness.start_feed_loop();

    common::eventually("admission", || harness.has_update("o1", "QUEUED")).await;
    let shop = &harness.shop;
    common::eventually("download", || async move {
        shop.downloads().downloaded_file("o1").is_some()
    })
    .await;

    let book = harness.shop.orders();
    assert_eq!(book.pending.len(), 1);
    assert_eq!(book.printed[0].order_id, "old");
    assert_eq!(harness.shop.ready_orders().len(), 1);

    // Refuses to print without a printer assignment.
    assert!(!harness.shop.start_printing().await);

    harness.configure_printers().await;
    assert!(harness.temp_dir.path().join("settings.json").exists());
    assert!(harness.shop.start_printing().await);

    common::eventually("printed status", || harness.has_update("o1", "PRINTED")).await;
    common::eventually("order book update", || async move {
        shop.orders().find("o1").is_some_and(|o| o.is_printed())
    })
    .await;

    let status = harness.shop.queue().status();
    assert_eq!(status.get("o1").unwrap().status, PrintStatus::Completed);
    assert_eq!(harness.submitter.submission_count().await, 1);
    assert!(harness.shop.ready_orders().is_empty());

    let _ = harness.shutdown_tx.send(());
}

#[tokio::test]
async fn test_unpaid_orders_are_not_admitted() {
    let harness = TestHarness::new();
    let mut unpaid = fixtures::submitted_order("unpaid", "http://127.0.0.1:9/doc.pdf");
    unpaid.paid = false;

    harness.shop.handle_orders(vec![unpaid]);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(harness.store.recorded_updates().await.is_empty());
    assert_eq!(harness.shop.downloads().state("unpaid"), DownloadState::Idle);
}

#[tokio::test]
async fn test_admission_is_requested_once_per_order() {
    let harness = TestHarness::new();
    harness.store.set_apply_updates(false).await;
    let order = fixtures::submitted_order("o1", "http://127.0.0.1:9/doc.pdf");

    harness.shop.handle_orders(vec![order.clone()]);
    harness.shop.handle_orders(vec![order.clone()]);
    harness.shop.handle_orders(vec![order]);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.store.recorded_updates().await.len(), 1);
    assert_eq!(harness.shop.orders().version, 3);
}

#[tokio::test]
async fn test_failed_download_waits_for_retry() {
    let harness = TestHarness::new();
    let docs = fixtures::serve_documents(vec![("/other.pdf", b"%PDF".to_vec())]).await;
    let order = fixtures::queued_order("o1", &format!("{}/missing.pdf", docs));

    harness.shop.handle_orders(vec![order.clone()]);
    let shop = &harness.shop;
    common::eventually("download failure", || async move {
        matches!(shop.downloads().state("o1"), DownloadState::Error { .. })
    })
    .await;

    // A later feed update does not restart it on its own.
    harness.shop.handle_orders(vec![order]);
    assert!(matches!(
        harness.shop.downloads().state("o1"),
        DownloadState::Error { .. }
    ));

    assert!(harness.shop.retry_download("o1"));
    assert!(!harness.shop.retry_download("unknown"));
}

#[tokio::test]
async fn test_start_printing_with_nothing_ready() {
    let harness = TestHarness::new();
    harness.configure_printers().await;

    assert!(!harness.shop.start_printing().await);
    assert!(!harness.shop.queue().is_running());
}

#[tokio::test]
async fn test_feed_errors_do_not_stop_the_loop() {
    let harness = TestHarness::new();
    harness.start_feed_loop();
    tokio::task::yield_now().await;

    harness.store.push_error("connection reset");
    harness
        .store
        .set_orders(vec![fixtures::order("done", status::PRINTED)]);

    let shop = &harness.shop;
    common::eventually("order book", || async move {
        shop.orders().find("done").is_some()
    })
    .await;

    let _ = harness.shutdown_tx.send(());
}

#[tokio::test]
async fn test_printers_and_assignment() {
    let harness = TestHarness::new();

    let printers = harness.shop.printers().await;
    assert_eq!(printers.printers, vec!["Office_Laser", "Photo_Color"]);
    assert_eq!(printers.default_printer.as_deref(), Some("Office_Laser"));

    assert!(!harness.shop.printer_assignment().await.is_configured());
    harness.configure_printers().await;
    assert_eq!(
        harness.shop.printer_assignment().await.fallback_printer,
        "Office_Laser"
    );

    let reloaded = SettingsStore::new(harness.temp_dir.path().join("settings.json"))
        .load()
        .await;
    assert_eq!(reloaded.fallback_printer, "Office_Laser");
}
