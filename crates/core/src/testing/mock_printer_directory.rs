//! Mock printer directory for testing.

use std::sync::RwLock;

use crate::printer::PrinterDirectory;

/// Mock implementation of the PrinterDirectory trait.
///
/// Starts empty: no printers, no default.
#[derive(Debug, Default)]
pub struct MockPrinterDirectory {
    printers: RwLock<Vec<String>>,
    default_printer: RwLock<Option<String>>,
}

impl MockPrinterDirectory {
    /// Create a new, empty mock directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory listing `printers` with `default` as system default.
    pub fn with_printers(printers: &[&str], default: Option<&str>) -> Self {
        let directory = Self::new();
        directory.set_printers(printers);
        directory.set_default(default);
        directory
    }

    /// Replace the printer list.
    pub fn set_printers(&self, printers: &[&str]) {
        if let Ok(mut list) = self.printers.write() {
            *list = printers.iter().map(|p| p.to_string()).collect();
        }
    }

    /// Replace the system default printer.
    pub fn set_default(&self, default: Option<&str>) {
        if let Ok(mut current) = self.default_printer.write() {
            *current = default.map(str::to_string);
        }
    }
}

impl PrinterDirectory for MockPrinterDirectory {
    fn list_printers(&self) -> Vec<String> {
        self.printers
            .read()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    fn default_printer(&self) -> Option<String> {
        self.default_printer
            .read()
            .ok()
            .and_then(|current| current.clone())
    }
}
