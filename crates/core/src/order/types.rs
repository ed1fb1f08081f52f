//! Order records as published by the remote order store, and their typed
//! print configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Order status strings used by the order store.
pub mod status {
    /// Order created by the customer, not yet admitted to the print queue.
    pub const SUBMITTED: &str = "SUBMITTED";
    /// Admitted to the print queue.
    pub const QUEUED: &str = "QUEUED";
    /// Printed by this shop.
    pub const PRINTED: &str = "PRINTED";
}

/// A customer order, read-only from the core's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub order_id: String,
    pub order_status: String,
    pub page_count: u32,
    pub paid: bool,
    pub payment_amount: f64,
    pub payment_status: String,
    pub created_at: String,
    pub customer_id: String,
    pub customer_phone: String,
    pub document_name: String,
    pub document_size: u64,
    pub document_url: String,
    pub has_settings: bool,
    pub in_queue: bool,
    pub print_settings: PrintSettings,
    pub can_auto_print: bool,
    pub queue_priority: i32,
    pub updated_at: String,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_id: String::new(),
            order_status: String::new(),
            page_count: 0,
            paid: false,
            payment_amount: 0.0,
            payment_status: String::new(),
            created_at: String::new(),
            customer_id: String::new(),
            customer_phone: String::new(),
            document_name: String::new(),
            document_size: 0,
            document_url: String::new(),
            has_settings: false,
            in_queue: false,
            print_settings: PrintSettings::default(),
            can_auto_print: false,
            queue_priority: 0,
            updated_at: String::new(),
        }
    }
}

impl Order {
    /// Whether the order store already marked this order as printed.
    pub fn is_printed(&self) -> bool {
        self.order_status == status::PRINTED
    }

    /// Paid but not yet admitted to the queue.
    pub fn is_ready_to_queue(&self) -> bool {
        self.paid && self.order_status == status::SUBMITTED
    }

    /// Paid, queued and pointing at a document we can fetch.
    pub fn is_download_eligible(&self) -> bool {
        self.paid && self.order_status == status::QUEUED && !self.document_url.is_empty()
    }

    /// Typed print configuration for this order.
    pub fn configuration(&self) -> PrintConfiguration {
        self.print_settings.configuration()
    }
}

/// Print settings as stored remotely (raw strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintSettings {
    pub color_mode: String,
    pub copies: i64,
    pub custom_pages: String,
    pub orientation: String,
    pub pages_to_print: String,
    pub paper_size: String,
    pub quality: String,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            color_mode: "COLOR".to_string(),
            copies: 1,
            custom_pages: String::new(),
            orientation: "PORTRAIT".to_string(),
            pages_to_print: "ALL".to_string(),
            paper_size: "A4".to_string(),
            quality: "NORMAL".to_string(),
        }
    }
}

impl PrintSettings {
    /// Project the raw settings onto typed values.
    ///
    /// Unknown values never fail: each field falls back to its default and a
    /// warning is logged.
    pub fn configuration(&self) -> PrintConfiguration {
        let copies = if self.copies < 1 {
            warn!(copies = self.copies, "Invalid copy count, defaulting to 1");
            1
        } else {
            u32::try_from(self.copies).unwrap_or(u32::MAX)
        };

        let pages = match parse_or_default::<PageMode>(&self.pages_to_print, "page mode") {
            PageMode::All => PageSelection::All,
            PageMode::Custom => PageSelection::Custom(self.custom_pages.clone()),
        };

        PrintConfiguration {
            color_mode: parse_or_default(&self.color_mode, "color mode"),
            copies,
            paper_size: parse_or_default(&self.paper_size, "paper size"),
            orientation: parse_or_default(&self.orientation, "orientation"),
            quality: parse_or_default(&self.quality, "quality"),
            pages,
        }
    }
}

fn parse_or_default<T>(raw: &str, field: &str) -> T
where
    T: FromStr + Default + fmt::Display,
{
    raw.parse().unwrap_or_else(|_| {
        let fallback = T::default();
        warn!(
            value = raw,
            default = %fallback,
            "Unknown {}, using default",
            field
        );
        fallback
    })
}

/// Error returned when a print setting string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct UnknownValue(pub String);

/// Typed print configuration of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintConfiguration {
    pub color_mode: ColorMode,
    pub copies: u32,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub quality: Quality,
    pub pages: PageSelection,
}

impl Default for PrintConfiguration {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::default(),
            copies: 1,
            paper_size: PaperSize::default(),
            orientation: Orientation::default(),
            quality: Quality::default(),
            pages: PageSelection::All,
        }
    }
}

/// Which pages of the document to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "range", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageSelection {
    All,
    /// Free-text page range, e.g. "1-3,5".
    Custom(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum PageMode {
    #[default]
    All,
    Custom,
}

impl FromStr for PageMode {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl fmt::Display for PageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Custom => f.write_str("CUSTOM"),
        }
    }
}

/// Color mode requested for the print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorMode {
    #[default]
    Color,
    Monochrome,
}

impl FromStr for ColorMode {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLOR" | "COLOUR" => Ok(Self::Color),
            "MONOCHROME" | "BW" | "BLACK_WHITE" | "BLACKWHITE" | "GRAYSCALE" | "GREY" => {
                Ok(Self::Monochrome)
            }
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color => f.write_str("COLOR"),
            Self::Monochrome => f.write_str("MONOCHROME"),
        }
    }
}

/// Paper size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    Letter,
    Legal,
}

impl FromStr for PaperSize {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A4" => Ok(Self::A4),
            "A3" => Ok(Self::A3),
            "LETTER" => Ok(Self::Letter),
            "LEGAL" => Ok(Self::Legal),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A4 => f.write_str("A4"),
            Self::A3 => f.write_str("A3"),
            Self::Letter => f.write_str("LETTER"),
            Self::Legal => f.write_str("LEGAL"),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PORTRAIT" => Ok(Self::Portrait),
            "LANDSCAPE" => Ok(Self::Landscape),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => f.write_str("PORTRAIT"),
            Self::Landscape => f.write_str("LANDSCAPE"),
        }
    }
}

/// Print quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    High,
    #[default]
    Normal,
    Draft,
}

impl FromStr for Quality {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "NORMAL" => Ok(Self::Normal),
            "DRAFT" => Ok(Self::Draft),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH"),
            Self::Normal => f.write_str("NORMAL"),
            Self::Draft => f.write_str("DRAFT"),
        }
    }
}
