//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without printers
//! or a remote order store.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::ServiceExt;

use autoprint_core::{
    config::{
        DownloadConfig, OrderStoreConfig, PrintingConfig, ServerConfig, SettingsConfig,
    },
    testing::{MockOrderStore, MockPrinterDirectory, MockSubmitter},
    Config, DocumentDownloader, DownloadTracker, PrintQueue, PrintShop, PrinterAssignment,
    QueueConfig, SettingsStore,
};

/// Re-export fixtures for test convenience
pub use autoprint_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Order store (MockOrderStore)
/// - Print submission (MockSubmitter)
/// - Printer enumeration (MockPrinterDirectory)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_start_queue() {
///     let fixture = TestFixture::new().await;
///     fixture.configure_printers().await;
///
///     let response = fixture.post("/api/v1/queue/start", json!({})).await;
///     assert_eq!(response.status, 409);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The shop behind the router
    pub shop: Arc<PrintShop>,
    /// Mock order store - records status updates
    pub store: Arc<MockOrderStore>,
    /// Mock submitter - control print outcomes
    pub submitter: Arc<MockSubmitter>,
    /// Mock printer directory - configure listed printers
    pub directory: Arc<MockPrinterDirectory>,
    /// Temporary directory for downloads and settings
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        // Create mocks
        let store = Arc::new(MockOrderStore::new());
        let submitter = Arc::new(MockSubmitter::new());
        let directory = Arc::new(MockPrinterDirectory::with_printers(
            &["Office_Laser", "Photo_Color"],
            Some("Office_Laser"),
        ));

        // Create config
        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            order_store: OrderStoreConfig {
                url: "http://orders.invalid/api".to_string(),
                api_key: Some("secret-key".to_string()),
                poll_interval_ms: 1000,
                timeout_secs: 5,
            },
            downloads: DownloadConfig {
                dir: temp_dir.path().join("downloads"),
                timeout_secs: 10,
            },
            queue: QueueConfig {
                inter_job_delay_ms: 10,
                ..Default::default()
            },
            printing: PrintingConfig::default(),
            settings: SettingsConfig {
                path: temp_dir.path().join("printer-settings.json"),
            },
        };

        let downloader =
            DocumentDownloader::new(&config.downloads).expect("Failed to create downloader");

        let queue = Arc::new(PrintQueue::new(
            config.queue.clone(),
            submitter.clone(),
            Some(store.clone()),
        ));

        let shop = Arc::new(PrintShop::new(
            store.clone(),
            directory.clone(),
            DownloadTracker::new(downloader),
            queue,
            Arc::new(RwLock::new(PrinterAssignment::default())),
            SettingsStore::new(&config.settings.path),
        ));

        // Create app state and router
        let state = Arc::new(autoprint_server::state::AppState::new(
            config,
            Arc::clone(&shop),
        ));
        let router = autoprint_server::api::create_router(state);

        Self {
            router,
            shop,
            store,
            submitter,
            directory,
            temp_dir,
        }
    }

    /// Assign a fallback printer through the shop.
    pub async fn configure_printers(&self) {
        self.shop
            .update_printer_assignment(PrinterAssignment {
                fallback_printer: "Office_Laser".to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to save printer assignment");
    }

    /// Feed a queued order whose document is served locally and wait until
    /// it is downloaded.
    pub async fn add_ready_order(&self, order_id: &str) {
        let path = format!("/{}.pdf", order_id);
        let base = fixtures::serve_documents(vec![(path.as_str(), b"%PDF-1.5".to_vec())]).await;

        let mut orders: Vec<_> = self.shop.orders().pending.clone();
        orders.push(fixtures::queued_order(order_id, &format!("{}{}", base, path)));
        self.shop.handle_orders(orders);

        for _ in 0..250 {
            if self.shop.downloads().downloaded_file(order_id).is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Document of {} was not downloaded", order_id);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
