//! Printer enumeration and lookup.

mod cups;

pub use cups::CupsPrinterDirectory;

use serde::{Deserialize, Serialize};

/// A resolved print target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterHandle {
    pub name: String,
}

impl PrinterHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Enumerates system printers.
///
/// All operations are synchronous and tolerate an empty printer set.
pub trait PrinterDirectory: Send + Sync {
    /// Printer names in system enumeration order.
    fn list_printers(&self) -> Vec<String>;

    /// The system default printer, if any.
    fn default_printer(&self) -> Option<String>;

    /// Exact, case-sensitive lookup of a printer by name.
    fn resolve(&self, name: &str) -> Option<PrinterHandle> {
        self.list_printers()
            .into_iter()
            .find(|printer| printer == name)
            .map(PrinterHandle::new)
    }
}
