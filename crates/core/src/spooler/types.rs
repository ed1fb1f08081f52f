//! Types for print spooling.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::order::{ColorMode, Orientation, PaperSize, PrintConfiguration, Quality};

/// Device attributes attached to a print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintAttributes {
    pub copies: u32,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub color_mode: ColorMode,
    pub quality: Quality,
}

impl PrintAttributes {
    /// IPP `media` keyword.
    pub fn media(&self) -> &'static str {
        match self.paper_size {
            PaperSize::A4 => "A4",
            PaperSize::A3 => "A3",
            PaperSize::Letter => "Letter",
            PaperSize::Legal => "Legal",
        }
    }

    /// IPP `orientation-requested` enum value.
    pub fn orientation_requested(&self) -> u8 {
        match self.orientation {
            Orientation::Portrait => 3,
            Orientation::Landscape => 4,
        }
    }

    /// IPP `print-color-mode` keyword.
    pub fn print_color_mode(&self) -> &'static str {
        match self.color_mode {
            ColorMode::Color => "color",
            ColorMode::Monochrome => "monochrome",
        }
    }

    /// IPP `print-quality` enum value.
    pub fn print_quality(&self) -> u8 {
        match self.quality {
            Quality::Draft => 3,
            Quality::Normal => 4,
            Quality::High => 5,
        }
    }
}

impl From<&PrintConfiguration> for PrintAttributes {
    fn from(config: &PrintConfiguration) -> Self {
        Self {
            copies: config.copies.max(1),
            paper_size: config.paper_size,
            orientation: config.orientation,
            color_mode: config.color_mode,
            quality: config.quality,
        }
    }
}

/// A job to hand to the spooler.
#[derive(Debug, Clone)]
pub struct SpoolRequest {
    /// Destination printer name.
    pub printer: String,
    /// Document to print.
    pub file: PathBuf,
    /// Job title shown in the printer queue.
    pub title: String,
    pub attributes: PrintAttributes,
}

/// Acknowledgement from the spooler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolReceipt {
    pub printer: String,
    /// Spooler job id, when it reported one.
    pub job_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_from_configuration() {
        let config = PrintConfiguration {
            color_mode: ColorMode::Monochrome,
            copies: 2,
            paper_size: PaperSize::Letter,
            orientation: Orientation::Landscape,
            quality: Quality::High,
            ..Default::default()
        };
        let attrs = PrintAttributes::from(&config);
        assert_eq!(attrs.copies, 2);
        assert_eq!(attrs.media(), "Letter");
        assert_eq!(attrs.orientation_requested(), 4);
        assert_eq!(attrs.print_color_mode(), "monochrome");
        assert_eq!(attrs.print_quality(), 5);
    }

    #[test]
    fn test_default_attributes() {
        let attrs = PrintAttributes::from(&PrintConfiguration::default());
        assert_eq!(attrs.copies, 1);
        assert_eq!(attrs.media(), "A4");
        assert_eq!(attrs.orientation_requested(), 3);
        assert_eq!(attrs.print_color_mode(), "color");
        assert_eq!(attrs.print_quality(), 4);
    }
}
