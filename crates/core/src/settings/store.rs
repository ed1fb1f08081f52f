use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};

use super::PrinterAssignment;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON file holding the persisted [`PrinterAssignment`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted assignment.
    ///
    /// A missing or unreadable file yields an unconfigured assignment.
    pub async fn load(&self) -> PrinterAssignment {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No printer settings saved yet");
                return PrinterAssignment::default();
            }
            Err(e) => {
                error!(path = %self.path.display(), "Failed to read printer settings: {}", e);
                return PrinterAssignment::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(assignment) => assignment,
            Err(e) => {
                error!(path = %self.path.display(), "Corrupt printer settings: {}", e);
                PrinterAssignment::default()
            }
        }
    }

    /// Persist the assignment as pretty JSON.
    pub async fn save(&self, assignment: &PrinterAssignment) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(assignment)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| self.io_error(source))?;

        info!(path = %self.path.display(), "Printer settings saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
