//! Mock print submitter for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::submit::{PrintJob, PrintProgress, PrintReceipt, PrintSubmitter, SubmitError};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    /// Order that was submitted.
    pub order_id: String,
    /// Document that was submitted.
    pub file: PathBuf,
    /// Whether the submission succeeded.
    pub success: bool,
}

/// Mock implementation of the PrintSubmitter trait.
///
/// Provides controllable behavior for testing:
/// - Track submissions in call order
/// - Simulate per-order or one-shot failures
/// - Simulate slow submissions
/// - Track how many submissions ran at the same time
///
/// # Example
///
/// ```rust,ignore
/// use autoprint_core::testing::MockSubmitter;
///
/// let submitter = MockSubmitter::new();
/// submitter.fail_order("order-2", SubmitError::NoPrinterFound).await;
///
/// // Run the queue...
///
/// let submissions = submitter.recorded_submissions().await;
/// assert_eq!(submissions[0].order_id, "order-1");
/// ```
#[derive(Debug)]
pub struct MockSubmitter {
    /// Recorded submissions.
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    /// If set, the next submission will fail with this error.
    next_error: Arc<RwLock<Option<SubmitError>>>,
    /// Orders that always fail.
    failing_orders: Arc<RwLock<HashMap<String, SubmitError>>>,
    /// Simulated submission duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    /// Printer reported on success.
    printer: Arc<RwLock<String>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubmitter {
    /// Create a new mock submitter.
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_orders: Arc::new(RwLock::new(HashMap::new())),
            duration_ms: Arc::new(RwLock::new(10)),
            printer: Arc::new(RwLock::new("MockPrinter".to_string())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded submissions, in call order.
    pub async fn recorded_submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    /// Get the number of submissions performed.
    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }

    /// Configure the next submission to fail with the given error.
    pub async fn set_next_error(&self, error: SubmitError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every submission of an order fail with the given error.
    pub async fn fail_order(&self, order_id: &str, error: SubmitError) {
        self.failing_orders
            .write()
            .await
            .insert(order_id.to_string(), error);
    }

    /// Set the simulated submission duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Set the printer name reported on success.
    pub async fn set_printer(&self, printer: &str) {
        *self.printer.write().await = printer.to_string();
    }

    /// Highest number of submissions that ran concurrently.
    pub fn max_concurrent_submissions(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn copy_error(error: &SubmitError) -> SubmitError {
    match error {
        SubmitError::NoPrinterFound => SubmitError::NoPrinterFound,
        SubmitError::NoPrinterAssigned(mode) => SubmitError::NoPrinterAssigned(*mode),
        SubmitError::NoValidPages(spec) => SubmitError::NoValidPages(spec.clone()),
        other => SubmitError::Internal(other.to_string()),
    }
}

#[async_trait]
impl PrintSubmitter for MockSubmitter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit_with_progress(
        &self,
        job: PrintJob,
        progress_tx: mpsc::Sender<PrintProgress>,
    ) -> Result<PrintReceipt, SubmitError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        // Decrement even if the caller drops this future mid-submission.
        struct InFlight(Arc<AtomicUsize>);
        impl Drop for InFlight {
            fn drop(&mut self) {
                self.0.fetch_sub(1, Ordering::SeqCst);
            }
        }
        let _guard = InFlight(Arc::clone(&self.in_flight));

        let order_id = job.order.order_id.clone();
        let _ = progress_tx
            .send(PrintProgress {
                order_id: order_id.clone(),
                stage: "Sending to printer...".to_string(),
            })
            .await;

        let duration = *self.duration_ms.read().await;
        if duration > 0 {
            tokio::time::sleep(Duration::from_millis(duration)).await;
        }

        let error = match self.next_error.write().await.take() {
            Some(error) => Some(error),
            None => self.failing_orders.read().await.get(&order_id).map(copy_error),
        };

        self.submissions.write().await.push(RecordedSubmission {
            order_id: order_id.clone(),
            file: job.file.clone(),
            success: error.is_none(),
        });

        match error {
            Some(error) => Err(error),
            None => Ok(PrintReceipt {
                printer: self.printer.read().await.clone(),
                job_id: Some(format!("mock-{}", order_id)),
                pages: None,
            }),
        }
    }
}
