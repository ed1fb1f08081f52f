//! HTTP document downloader.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::DownloadConfig;

use super::types::{DownloadError, DownloadState};

/// Fetches documents into the local downloads directory.
#[derive(Debug, Clone)]
pub struct DocumentDownloader {
    client: Client,
    dir: PathBuf,
}

impl DocumentDownloader {
    pub fn new(config: &DownloadConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| DownloadError::Client(e.to_string()))?;

        Ok(Self {
            client,
            dir: config.dir.clone(),
        })
    }

    /// Directory documents are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch `url` into `<dir>/<dest_name>`.
    ///
    /// The stream starts with `Downloading(0)`, then reports increasing
    /// progress when the server declares a content length, and ends with
    /// exactly one `Completed` or `Error`. Each call is a fresh attempt; a
    /// partial file from an earlier attempt is overwritten.
    pub fn materialize(&self, url: &str, dest_name: &str) -> BoxStream<'static, DownloadState> {
        let client = self.client.clone();
        let dir = self.dir.clone();
        let url = url.to_string();
        let dest = self.dir.join(dest_name);

        Box::pin(async_stream::stream! {
            yield DownloadState::Downloading { progress: 0.0 };

            if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                yield failed(&url, DownloadError::Io(e));
                return;
            }

            let response = match client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    yield failed(&url, DownloadError::Request(e));
                    return;
                }
            };

            if !response.status().is_success() {
                yield failed(&url, DownloadError::Status(response.status().as_u16()));
                return;
            }

            let total = response.content_length().filter(|len| *len > 0);
            debug!(url = %url, total = ?total, dest = %dest.display(), "Downloading document");

            let mut file = match tokio::fs::File::create(&dest).await {
                Ok(file) => file,
                Err(e) => {
                    yield failed(&url, DownloadError::Io(e));
                    return;
                }
            };

            let mut body = response.bytes_stream();
            let mut received: u64 = 0;
            let mut last_percent: u64 = 0;

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield failed(&url, DownloadError::Request(e));
                        return;
                    }
                };

                if let Err(e) = file.write_all(&chunk).await {
                    yield failed(&url, DownloadError::Io(e));
                    return;
                }

                received += chunk.len() as u64;

                if let Some(total) = total {
                    let percent = (received.min(total) * 100) / total;
                    if percent > last_percent {
                        last_percent = percent;
                        yield DownloadState::Downloading { progress: percent as f32 / 100.0 };
                    }
                }
            }

            if let Err(e) = file.flush().await {
                yield failed(&url, DownloadError::Io(e));
                return;
            }

            info!(url = %url, bytes = received, dest = %dest.display(), "Document downloaded");
            yield DownloadState::Completed { path: dest };
        })
    }
}

fn failed(url: &str, error: DownloadError) -> DownloadState {
    warn!(url, "Download failed: {}", error);
    DownloadState::Error {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    fn downloader(dir: &Path) -> DocumentDownloader {
        DocumentDownloader::new(&DownloadConfig {
            dir: dir.to_path_buf(),
            timeout_secs: 10,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_materialize_reports_progress_then_completes() {
        let body = vec![7u8; 256 * 1024];
        let base = fixtures::serve_documents(vec![("/doc.pdf", body.clone())]).await;
        let dir = TempDir::new().unwrap();

        let states: Vec<DownloadState> = downloader(&dir.path().join("downloads"))
            .materialize(&format!("{}/doc.pdf", base), "o1_doc.pdf")
            .collect()
            .await;

        assert_eq!(states.first(), Some(&DownloadState::Downloading { progress: 0.0 }));

        let mut last = 0.0;
        for state in &states[1..states.len() - 1] {
            match state {
                DownloadState::Downloading { progress } => {
                    assert!(*progress >= last && *progress <= 1.0);
                    last = *progress;
                }
                other => panic!("unexpected intermediate state {:?}", other),
            }
        }

        let path = states.last().unwrap().completed_path().unwrap().clone();
        assert_eq!(path, dir.path().join("downloads").join("o1_doc.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), body);
    }

    #[tokio::test]
    async fn test_materialize_http_error() {
        let base = fixtures::serve_documents(vec![]).await;
        let dir = TempDir::new().unwrap();

        let states: Vec<DownloadState> = downloader(dir.path())
            .materialize(&format!("{}/missing.pdf", base), "x.pdf")
            .collect()
            .await;

        assert_eq!(states.len(), 2);
        assert_eq!(
            states[1],
            DownloadState::Error {
                message: "server returned HTTP 404".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_materialize_unreachable() {
        let dir = TempDir::new().unwrap();
        let states: Vec<DownloadState> = downloader(dir.path())
            .materialize("http://127.0.0.1:1/doc.pdf", "x.pdf")
            .collect()
            .await;

        assert!(matches!(states.last(), Some(DownloadState::Error { .. })));
    }
}
