//! Print submitter backed by a printer directory and a spooler.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::document;
use crate::metrics;
use crate::order::{ColorMode, PageSelection};
use crate::pages::resolve_pages;
use crate::printer::PrinterDirectory;
use crate::settings::PrinterAssignment;
use crate::spooler::{PrintAttributes, PrintSpooler, SpoolRequest};

use super::error::SubmitError;
use super::traits::PrintSubmitter;
use super::types::{PrintJob, PrintProgress, PrintReceipt};

/// Resolves the printer, narrows the document to the selected pages and
/// hands it to the spooler.
pub struct SpoolerSubmitter {
    directory: Arc<dyn PrinterDirectory>,
    spooler: Arc<dyn PrintSpooler>,
    assignment: Arc<RwLock<PrinterAssignment>>,
    work_dir: PathBuf,
}

impl SpoolerSubmitter {
    /// Create a submitter. `assignment` is shared with whoever edits the
    /// printer settings; changes apply to the next submission.
    pub fn new(
        directory: Arc<dyn PrinterDirectory>,
        spooler: Arc<dyn PrintSpooler>,
        assignment: Arc<RwLock<PrinterAssignment>>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            directory,
            spooler,
            assignment,
            work_dir: work_dir.into(),
        }
    }

    async fn resolve_printer(&self, color_mode: ColorMode) -> Result<String, SubmitError> {
        let directory = Arc::clone(&self.directory);
        let assignment = self.assignment.read().await.clone();

        tokio::task::spawn_blocking(move || {
            resolve_printer(directory.as_ref(), &assignment, color_mode)
        })
        .await
        .map_err(|e| SubmitError::Internal(e.to_string()))?
    }

    async fn run(
        &self,
        job: PrintJob,
        progress: &Progress,
    ) -> Result<PrintReceipt, SubmitError> {
        let order = &job.order;
        info!(order_id = %order.order_id, file = %job.file.display(), "Starting print job");

        progress.report("Preparing document for printing...").await;
        document::ensure_supported(&job.file)?;

        progress.report("Loading PDF document...").await;
        let total_pages = document::page_count(&job.file).await?;
        debug!(order_id = %order.order_id, total_pages, "Document loaded");

        let config = order.configuration();

        progress.report("Setting up printer...").await;
        let printer = self.resolve_printer(config.color_mode).await?;
        info!(order_id = %order.order_id, printer = %printer, "Using printer");

        let selected = match &config.pages {
            PageSelection::All => None,
            PageSelection::Custom(spec) => {
                let pages = resolve_pages(spec, total_pages);
                if pages.is_empty() {
                    warn!(order_id = %order.order_id, range = %spec, "No valid pages to print");
                    return Err(SubmitError::NoValidPages(spec.clone()));
                }
                Some(pages)
            }
        };

        progress.report("Configuring print settings...").await;
        let attributes = PrintAttributes::from(&config);

        // Held until the spooler returns; dropping it removes the copy.
        let subset = match &selected {
            Some(pages) if !covers_all(pages, total_pages) => {
                progress.report("Preparing selected pages...").await;
                Some(document::write_page_subset(&job.file, pages, &self.work_dir).await?)
            }
            _ => None,
        };

        let file = subset
            .as_ref()
            .map(|copy| copy.path().to_path_buf())
            .unwrap_or_else(|| job.file.clone());

        progress.report("Sending to printer...").await;
        let receipt = self
            .spooler
            .submit(SpoolRequest {
                printer: printer.clone(),
                file,
                title: job_title(order.order_id.as_str(), order.document_name.as_str()),
                attributes,
            })
            .await?;

        progress.report("Print job submitted successfully").await;

        Ok(PrintReceipt {
            printer: receipt.printer,
            job_id: receipt.job_id,
            pages: selected.map(|pages| pages.into_iter().collect()),
        })
    }
}

#[async_trait]
impl PrintSubmitter for SpoolerSubmitter {
    fn name(&self) -> &str {
        self.spooler.name()
    }

    async fn submit_with_progress(
        &self,
        job: PrintJob,
        progress_tx: mpsc::Sender<PrintProgress>,
    ) -> Result<PrintReceipt, SubmitError> {
        let progress = Progress {
            order_id: job.order.order_id.clone(),
            tx: progress_tx,
        };
        let order_id = job.order.order_id.clone();
        let started = Instant::now();

        let result = self.run(job, &progress).await;

        let label = if result.is_ok() { "success" } else { "failure" };
        metrics::PRINT_SUBMISSION_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(receipt) => info!(
                order_id = %order_id,
                printer = %receipt.printer,
                job_id = ?receipt.job_id,
                "Print job accepted"
            ),
            Err(e) => warn!(order_id = %order_id, "Print job failed: {}", e),
        }

        result
    }
}

struct Progress {
    order_id: String,
    tx: mpsc::Sender<PrintProgress>,
}

impl Progress {
    async fn report(&self, stage: &str) {
        let _ = self
            .tx
            .send(PrintProgress {
                order_id: self.order_id.clone(),
                stage: stage.to_string(),
            })
            .await;
    }
}

fn covers_all(pages: &BTreeSet<u32>, total_pages: u32) -> bool {
    pages.len() as u32 == total_pages
}

fn job_title(order_id: &str, document_name: &str) -> String {
    if document_name.is_empty() {
        order_id.to_string()
    } else {
        format!("{} - {}", order_id, document_name)
    }
}

/// Pick the printer for a color mode.
///
/// With a configured assignment the mode's slot (or the fallback slot) wins;
/// an empty slot fails, and a slot naming an unknown printer falls back to
/// the system default. Without an assignment the system default is used,
/// else the first listed printer.
pub fn resolve_printer(
    directory: &dyn PrinterDirectory,
    assignment: &PrinterAssignment,
    color_mode: ColorMode,
) -> Result<String, SubmitError> {
    if assignment.is_configured() {
        let assigned = assignment.printer_for(color_mode);
        if assigned.is_empty() {
            warn!(%color_mode, "No printer assigned for color mode");
            return Err(SubmitError::NoPrinterAssigned(color_mode));
        }

        if let Some(handle) = directory.resolve(assigned) {
            return Ok(handle.name);
        }

        warn!(printer = assigned, "Assigned printer not found, using system default");
        return directory.default_printer().ok_or(SubmitError::NoPrinterFound);
    }

    directory
        .default_printer()
        .or_else(|| directory.list_printers().into_iter().next())
        .ok_or(SubmitError::NoPrinterFound)
}
