//! Types for document downloads.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a download attempt.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// Writing the local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// State of one order's document download.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadState {
    #[default]
    Idle,
    /// Fraction received, in `[0, 1]`.
    Downloading { progress: f32 },
    Completed { path: PathBuf },
    Error { message: String },
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Downloading { .. })
    }

    /// Local file of a completed download.
    pub fn completed_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Completed { path } => Some(path),
            _ => None,
        }
    }
}

/// Immutable view of every order's download state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadSnapshot {
    /// Incremented on every change.
    pub version: u64,
    pub states: HashMap<String, DownloadState>,
}

impl DownloadSnapshot {
    /// Materialized files by order id.
    pub fn files(&self) -> HashMap<String, PathBuf> {
        self.states
            .iter()
            .filter_map(|(id, state)| state.completed_path().map(|p| (id.clone(), p.clone())))
            .collect()
    }
}
