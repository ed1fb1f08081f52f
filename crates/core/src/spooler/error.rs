//! Error types for the spooler module.

use thiserror::Error;

/// Errors that can occur while handing a job to the print subsystem.
#[derive(Debug, Error)]
pub enum SpoolError {
    /// Spooler command not found.
    #[error("print spooler command not found: {command}")]
    CommandNotFound { command: String },

    /// The spooler refused the job.
    #[error("print spooler rejected job: {reason}")]
    Rejected { reason: String },

    /// The spooler did not answer in time.
    #[error("print submission timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error talking to the spooler.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
