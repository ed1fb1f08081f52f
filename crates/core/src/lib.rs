pub mod config;
pub mod document;
pub mod download;
pub mod metrics;
pub mod order;
pub mod pages;
pub mod printer;
pub mod queue;
pub mod settings;
pub mod shop;
pub mod spooler;
pub mod submit;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use download::{DownloadSnapshot, DownloadState, DownloadTracker, DocumentDownloader};
pub use order::{HttpOrderStore, Order, OrderFeed, OrderStatusUpdater, OrderStoreError};
pub use printer::{CupsPrinterDirectory, PrinterDirectory};
pub use queue::{PrintJobStatus, PrintQueue, PrintStatus, QueueConfig, StatusSnapshot};
pub use settings::{PrinterAssignment, SettingsStore};
pub use shop::{OrderBook, PrintShop, PrinterList};
pub use spooler::{LpSpooler, PrintSpooler};
pub use submit::{PrintSubmitter, SpoolerSubmitter, SubmitError};
