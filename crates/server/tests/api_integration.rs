//! End-to-end API tests with mocked collaborators.
//!
//! These tests run the full router in-process with a mock order store,
//! submitter and printer directory.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use autoprint_core::submit::SubmitError;
use common::{fixtures, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_api_key() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["order_store"]["api_key_configured"], true);
    assert_eq!(response.body["queue"]["inter_job_delay_ms"], 10);
    assert!(!response.body.to_string().contains("secret-key"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("autoprint_http_requests_total"));
    assert!(body.contains("autoprint_queue_jobs_by_status"));
}

// =============================================================================
// Printers and Settings
// =============================================================================

#[tokio::test]
async fn test_list_printers() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/printers").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["printers"], json!(["Office_Laser", "Photo_Color"]));
    assert_eq!(response.body["default_printer"], "Office_Laser");
}

#[tokio::test]
async fn test_printer_assignment_roundtrip() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/settings/printers").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["colorPrinter"], "");

    let response = fixture
        .put(
            "/api/v1/settings/printers",
            json!({
                "colorPrinter": "Photo_Color",
                "blackWhitePrinter": "Office_Laser"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["bothPrinter"], "");

    let response = fixture.get("/api/v1/settings/printers").await;
    assert_eq!(response.body["colorPrinter"], "Photo_Color");
    assert_eq!(response.body["blackWhitePrinter"], "Office_Laser");

    let saved = std::fs::read_to_string(fixture.temp_dir.path().join("printer-settings.json"))
        .expect("Settings file not written");
    assert!(saved.contains("Photo_Color"));
}

// =============================================================================
// Print Queue
// =============================================================================

#[tokio::test]
async fn test_start_requires_printer_settings() {
    let fixture = TestFixture::new().await;
    let response = fixture.post("/api/v1/queue/start", json!({})).await;

    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(response.body["error"], "Printer settings not configured");
}

#[tokio::test]
async fn test_start_with_nothing_ready() {
    let fixture = TestFixture::new().await;
    fixture.configure_printers().await;

    let response = fixture.post("/api/v1/queue/start", json!({})).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "No orders ready to print");
}

#[tokio::test]
async fn test_print_ready_orders_through_api() {
    let fixture = TestFixture::new().await;
    fixture.configure_printers().await;
    fixture
        .submitter
        .fail_order("o2", SubmitError::NoPrinterFound)
        .await;
    fixture.add_ready_order("o1").await;
    fixture.add_ready_order("o2").await;

    let orders = fixture.get("/api/v1/orders").await;
    assert_eq!(orders.body["pending"].as_array().unwrap().len(), 2);
    assert_eq!(orders.body["pending"][0]["ready"], true);
    assert_eq!(orders.body["pending"][0]["download"]["state"], "completed");

    let response = fixture.post("/api/v1/queue/start", json!({})).await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let mut feed = fixture.shop.queue().subscribe();
    tokio::time::timeout(Duration::from_secs(5), feed.wait_for(|s| !s.running))
        .await
        .expect("Queue did not finish")
        .expect("Status board dropped");

    let status = fixture.get("/api/v1/queue").await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["running"], false);
    assert_eq!(status.body["jobs"]["o1"]["status"], "COMPLETED");
    assert_eq!(status.body["jobs"]["o2"]["status"], "FAILED");
    assert_eq!(status.body["jobs"]["o2"]["message"], "No printer found");

    let response = fixture.post("/api/v1/queue/clear", json!({})).await;
    assert_eq!(response.body["removed"], 2);
}

#[tokio::test]
async fn test_stop_cancels_run() {
    let fixture = TestFixture::new().await;
    fixture.configure_printers().await;
    fixture
        .submitter
        .set_duration(Duration::from_millis(500))
        .await;
    fixture.add_ready_order("slow").await;

    let response = fixture.post("/api/v1/queue/start", json!({})).await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let response = fixture.post("/api/v1/queue/start", json!({})).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "Print queue already running");

    let response = fixture.post("/api/v1/queue/stop", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);

    let status = fixture.get("/api/v1/queue").await;
    assert_eq!(status.body["running"], false);
    assert_eq!(status.body["jobs"]["slow"]["status"], "CANCELLED");
    assert_eq!(status.body["jobs"]["slow"]["message"], "Cancelled by user");
}

// =============================================================================
// Downloads
// =============================================================================

#[tokio::test]
async fn test_retry_unknown_download() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/downloads/nope/retry", json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_retry_failed_download() {
    let fixture = TestFixture::new().await;
    let base = fixtures::serve_documents(vec![("/exists.pdf", b"%PDF".to_vec())]).await;
    fixture.shop.handle_orders(vec![fixtures::queued_order(
        "broken",
        &format!("{}/missing.pdf", base),
    )]);

    for _ in 0..250 {
        let downloads = fixture.get("/api/v1/downloads").await;
        if downloads.body["states"]["broken"]["state"] == "error" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let response = fixture
        .post("/api/v1/downloads/broken/retry", json!({}))
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_cancel_without_download() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/downloads/nope/cancel", json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
