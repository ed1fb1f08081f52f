use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::queue::QueueConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub order_store: OrderStoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub printing: PrintingConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Remote order store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderStoreConfig {
    /// Base URL of the order store REST API (e.g., "https://shop.example.com/api")
    pub url: String,
    /// Bearer token sent with every request
    #[serde(default)]
    pub api_key: Option<String>,
    /// How often the order collection is polled (milliseconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u32,
}

fn default_poll_interval() -> u64 {
    5000
}

fn default_store_timeout() -> u32 {
    30
}

/// Document download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Private directory documents are written to
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
    /// Whole-transfer timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
            timeout_secs: default_download_timeout(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_download_timeout() -> u32 {
    300
}

/// Print spooler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrintingConfig {
    /// Command used to submit jobs (CUPS `lp`)
    #[serde(default = "default_lp_command")]
    pub lp_command: String,
    /// Command used to enumerate printers (CUPS `lpstat`)
    #[serde(default = "default_lpstat_command")]
    pub lpstat_command: String,
    /// Upper bound for a single submission to be accepted by the spooler
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u32,
    /// Scratch directory for page-filtered document copies
    #[serde(default = "std::env::temp_dir")]
    pub work_dir: PathBuf,
}

impl Default for PrintingConfig {
    fn default() -> Self {
        Self {
            lp_command: default_lp_command(),
            lpstat_command: default_lpstat_command(),
            submit_timeout_secs: default_submit_timeout(),
            work_dir: std::env::temp_dir(),
        }
    }
}

fn default_lp_command() -> String {
    "lp".to_string()
}

fn default_lpstat_command() -> String {
    "lpstat".to_string()
}

fn default_submit_timeout() -> u32 {
    120
}

/// Local settings persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsConfig {
    /// JSON file holding the printer assignment
    #[serde(default = "default_settings_path")]
    pub path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("printer-settings.json")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub order_store: SanitizedOrderStoreConfig,
    pub downloads: DownloadConfig,
    pub queue: QueueConfig,
    pub printing: PrintingConfig,
    pub settings: SettingsConfig,
}

/// Sanitized order store config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOrderStoreConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub poll_interval_ms: u64,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            order_store: SanitizedOrderStoreConfig {
                url: config.order_store.url.clone(),
                api_key_configured: config
                    .order_store
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                poll_interval_ms: config.order_store.poll_interval_ms,
                timeout_secs: config.order_store.timeout_secs,
            },
            downloads: config.downloads.clone(),
            queue: config.queue.clone(),
            printing: config.printing.clone(),
            settings: config.settings.clone(),
        }
    }
}
