//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing the queue and the shop workflow to be tested without printers,
//! a spooler or a remote order store.
//!
//! # Example
//!
//! ```rust,ignore
//! use autoprint_core::testing::{MockSubmitter, MockOrderStore};
//!
//! let submitter = MockSubmitter::new();
//! let store = MockOrderStore::new();
//!
//! // Configure mock behavior
//! submitter.set_duration(Duration::from_millis(50)).await;
//! store.set_orders(vec![/* orders */]);
//!
//! // Use in PrintQueue / PrintShop...
//! ```

mod mock_order_store;
mod mock_printer_directory;
mod mock_spooler;
mod mock_submitter;

pub use mock_order_store::{MockOrderStore, RecordedUpdate};
pub use mock_printer_directory::MockPrinterDirectory;
pub use mock_spooler::{MockSpooler, RecordedSpool};
pub use mock_submitter::{MockSubmitter, RecordedSubmission};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use lopdf::{dictionary, Document, Object, Stream};

    use crate::order::{status, Order, PrintSettings};

    /// Create a test order with reasonable defaults.
    pub fn order(order_id: &str, order_status: &str) -> Order {
        Order {
            order_id: order_id.to_string(),
            order_status: order_status.to_string(),
            paid: true,
            page_count: 1,
            payment_amount: 2.5,
            payment_status: "PAID".to_string(),
            created_at: "2024-01-01T10:00:00Z".to_string(),
            customer_id: format!("customer-{}", order_id),
            document_name: format!("{}.pdf", order_id),
            document_url: format!("https://files.example.com/{}.pdf", order_id),
            has_settings: true,
            print_settings: PrintSettings::default(),
            ..Default::default()
        }
    }

    /// A paid order already admitted to the queue, fetching from `url`.
    pub fn queued_order(order_id: &str, url: &str) -> Order {
        let mut order = order(order_id, status::QUEUED);
        order.document_url = url.to_string();
        order
    }

    /// A paid order waiting for admission, fetching from `url`.
    pub fn submitted_order(order_id: &str, url: &str) -> Order {
        let mut order = order(order_id, status::SUBMITTED);
        order.document_url = url.to_string();
        order
    }

    /// Build an in-memory PDF with `pages` blank A4 pages.
    pub fn pdf_document(pages: u32) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                });
                page_id.into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => i64::from(pages),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    /// Write a blank PDF with `pages` pages to `dir/name`.
    pub fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
        let path = dir.join(name);
        pdf_document(pages)
            .save(&path)
            .expect("failed to write test PDF");
        path
    }

    /// Serve fixed documents from an in-process HTTP server. Returns the
    /// base URL; unknown paths answer 404.
    pub async fn serve_documents(documents: Vec<(&str, Vec<u8>)>) -> String {
        use axum::routing::get;
        use axum::Router;

        let mut router = Router::new();
        for (path, body) in documents {
            router = router.route(path, get(move || async move { body.clone() }));
        }
        serve(router).await
    }

    /// Serve `/slow.pdf`, which sends a few bytes and then stalls forever.
    pub async fn serve_stalled() -> String {
        use axum::body::Body;
        use axum::routing::get;
        use axum::Router;
        use futures::StreamExt;

        let router = Router::new().route(
            "/slow.pdf",
            get(|| async {
                let head = futures::stream::once(async {
                    Ok::<Vec<u8>, std::io::Error>(b"%PDF-1.5".to_vec())
                });
                Body::from_stream(head.chain(futures::stream::pending()))
            }),
        );
        serve(router).await
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test server");
        let addr = listener.local_addr().expect("no local address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{}", addr)
    }
}
