//! Print submission.
//!
//! Steps for one job:
//! 1. Check the document format and count its pages
//! 2. Resolve the target printer
//! 3. Resolve custom page ranges (a non-blank range selecting nothing fails)
//! 4. Build device attributes from the order's configuration
//! 5. Narrow the document to the selected pages in a temporary copy
//! 6. Hand the document to the spooler

mod error;
mod spooler_submitter;
mod traits;
mod types;

pub use error::SubmitError;
pub use spooler_submitter::{resolve_printer, SpoolerSubmitter};
pub use traits::PrintSubmitter;
pub use types::{PrintJob, PrintProgress, PrintReceipt};
