//! Mock print spooler for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::document;
use crate::spooler::{PrintSpooler, SpoolError, SpoolReceipt, SpoolRequest};

/// A recorded spool request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSpool {
    /// The request that was submitted.
    pub request: SpoolRequest,
    /// Pages of the submitted document, read at submission time.
    pub page_count: Option<u32>,
}

/// Mock implementation of the PrintSpooler trait.
#[derive(Debug, Default)]
pub struct MockSpooler {
    requests: Arc<RwLock<Vec<RecordedSpool>>>,
    next_error: Arc<RwLock<Option<SpoolError>>>,
}

impl MockSpooler {
    /// Create a new mock spooler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RecordedSpool> {
        self.requests.read().await.clone()
    }

    /// Get the number of accepted or rejected submissions.
    pub async fn submission_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next submission to fail with the given error.
    pub async fn set_next_error(&self, error: SpoolError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl PrintSpooler for MockSpooler {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: SpoolRequest) -> Result<SpoolReceipt, SpoolError> {
        let page_count = document::page_count(&request.file).await.ok();

        let mut requests = self.requests.write().await;
        requests.push(RecordedSpool {
            request: request.clone(),
            page_count,
        });
        let job_number = requests.len();
        drop(requests);

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(SpoolReceipt {
            job_id: Some(format!("{}-{}", request.printer, job_number)),
            printer: request.printer,
        })
    }
}
