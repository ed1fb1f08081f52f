//! Print submitter trait definition.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::SubmitError;
use super::types::{PrintJob, PrintProgress, PrintReceipt};

/// Turns a materialized document plus its order's configuration into an
/// accepted print job.
#[async_trait]
pub trait PrintSubmitter: Send + Sync {
    /// Returns the name of this submitter implementation.
    fn name(&self) -> &str;

    /// Submits a job with progress reporting.
    ///
    /// If the receiver is dropped, submission continues without progress
    /// reporting.
    async fn submit_with_progress(
        &self,
        job: PrintJob,
        progress_tx: mpsc::Sender<PrintProgress>,
    ) -> Result<PrintReceipt, SubmitError>;

    /// Submits a job without progress reporting.
    async fn submit(&self, job: PrintJob) -> Result<PrintReceipt, SubmitError> {
        let (progress_tx, _) = mpsc::channel(1);
        self.submit_with_progress(job, progress_tx).await
    }
}
