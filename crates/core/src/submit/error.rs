//! Error types for print submission.

use thiserror::Error;

use crate::document::DocumentError;
use crate::order::ColorMode;
use crate::spooler::SpoolError;

/// Reasons a print submission fails. The display text becomes the order's
/// terminal status message.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Nothing to print on.
    #[error("No printer found")]
    NoPrinterFound,

    /// The assignment is configured but has no slot for this color mode.
    #[error("No printer assigned for {0} printing")]
    NoPrinterAssigned(ColorMode),

    /// A non-blank custom page range selects no page of the document.
    #[error("No valid pages to print from range: {0}")]
    NoValidPages(String),

    /// Document could not be read or narrowed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Spooler refused or failed the job.
    #[error("Print error: {0}")]
    Spool(#[from] SpoolError),

    /// Background task failed.
    #[error("Print error: {0}")]
    Internal(String),
}
