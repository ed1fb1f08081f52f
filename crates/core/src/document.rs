//! PDF document handling.
//!
//! Parsing and re-encoding run on the blocking pool.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("failed to write page subset: {0}")]
    Write(String),

    #[error("document has no pages")]
    NoPages,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Fail unless the file is a PDF (by extension, case-insensitive).
pub fn ensure_supported(path: &Path) -> Result<(), DocumentError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default();

    if extension.eq_ignore_ascii_case("pdf") {
        Ok(())
    } else {
        Err(DocumentError::UnsupportedFormat(extension))
    }
}

fn load(path: &Path) -> Result<Document, DocumentError> {
    Document::load(path).map_err(|e| DocumentError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Number of pages in a PDF.
pub async fn page_count(path: &Path) -> Result<u32, DocumentError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let document = load(&path)?;
        let count = document.get_pages().len() as u32;
        debug!(path = %path.display(), pages = count, "Loaded document");
        Ok(count)
    })
    .await?
}

/// Write a new PDF holding only `pages` (1-based) of `source`.
///
/// The copy is a temporary file in `work_dir`, removed when dropped.
pub async fn write_page_subset(
    source: &Path,
    pages: &BTreeSet<u32>,
    work_dir: &Path,
) -> Result<NamedTempFile, DocumentError> {
    let source = source.to_path_buf();
    let pages = pages.clone();
    let work_dir = work_dir.to_path_buf();

    tokio::task::spawn_blocking(move || write_page_subset_sync(&source, &pages, &work_dir)).await?
}

fn write_page_subset_sync(
    source: &Path,
    pages: &BTreeSet<u32>,
    work_dir: &Path,
) -> Result<NamedTempFile, DocumentError> {
    let mut document = load(source)?;

    let drop_pages: Vec<u32> = document
        .get_pages()
        .keys()
        .copied()
        .filter(|page| !pages.contains(page))
        .collect();

    if drop_pages.len() == document.get_pages().len() {
        return Err(DocumentError::NoPages);
    }

    document.delete_pages(&drop_pages);
    document.prune_objects();
    document.renumber_objects();
    document.compress();

    std::fs::create_dir_all(work_dir)?;
    let mut copy = tempfile::Builder::new()
        .prefix("autoprint-")
        .suffix(".pdf")
        .tempfile_in(work_dir)?;

    document
        .save_to(copy.as_file_mut())
        .map_err(|e| DocumentError::Write(e.to_string()))?;

    debug!(
        source = %source.display(),
        kept = pages.len(),
        copy = %copy.path().display(),
        "Wrote page subset"
    );
    Ok(copy)
}
