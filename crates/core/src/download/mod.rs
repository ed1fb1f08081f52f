//! Document materialization.
//!
//! [`DocumentDownloader`] fetches one document as a finite stream of
//! [`DownloadState`] frames. [`DownloadTracker`] runs one such stream per
//! order and publishes the per-order states as snapshots.

mod downloader;
mod tracker;
mod types;

pub use downloader::DocumentDownloader;
pub use tracker::{local_file_name, DownloadTracker};
pub use types::{DownloadError, DownloadSnapshot, DownloadState};
