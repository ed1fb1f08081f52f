//! Printer assignment and its persistence.

mod store;

pub use store::{SettingsError, SettingsStore};

use serde::{Deserialize, Serialize};

use crate::order::ColorMode;

/// User configuration mapping color modes to printer names.
///
/// An empty string means the slot is unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterAssignment {
    /// Printer used for color jobs.
    #[serde(rename = "colorPrinter")]
    pub color_printer: String,
    /// Printer used for monochrome jobs.
    #[serde(rename = "blackWhitePrinter")]
    pub black_white_printer: String,
    /// Printer used when the mode's own slot is empty.
    #[serde(rename = "bothPrinter")]
    pub fallback_printer: String,
}

impl PrinterAssignment {
    /// Printer assigned to the given color mode.
    ///
    /// Returns the mode's own slot, else the fallback slot, else `""`.
    pub fn printer_for(&self, color_mode: ColorMode) -> &str {
        let specific = match color_mode {
            ColorMode::Color => &self.color_printer,
            ColorMode::Monochrome => &self.black_white_printer,
        };

        if !specific.is_empty() {
            specific
        } else {
            &self.fallback_printer
        }
    }

    /// Whether any slot is assigned.
    pub fn is_configured(&self) -> bool {
        !self.color_printer.is_empty()
            || !self.black_white_printer.is_empty()
            || !self.fallback_printer.is_empty()
    }
}
