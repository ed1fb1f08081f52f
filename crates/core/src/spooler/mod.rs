//! Print spooler backends.
//!
//! A spooler accepts a document plus device attributes for a named printer.

mod error;
mod lp;
mod traits;
mod types;

pub use error::SpoolError;
pub use lp::LpSpooler;
pub use traits::PrintSpooler;
pub use types::{PrintAttributes, SpoolReceipt, SpoolRequest};
