//! CUPS `lp` spooler implementation.

use std::process::Stdio;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::error::SpoolError;
use super::traits::PrintSpooler;
use super::types::{PrintAttributes, SpoolReceipt, SpoolRequest};

/// Spooler that submits jobs with the CUPS `lp` command.
#[derive(Debug, Clone)]
pub struct LpSpooler {
    lp_command: String,
    timeout_secs: u64,
}

impl LpSpooler {
    pub fn new(lp_command: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            lp_command: lp_command.into(),
            timeout_secs,
        }
    }

    /// Command-line arguments for a request.
    pub fn build_args(request: &SpoolRequest) -> Vec<String> {
        let attrs: &PrintAttributes = &request.attributes;
        vec![
            "-d".to_string(),
            request.printer.clone(),
            "-n".to_string(),
            attrs.copies.to_string(),
            "-t".to_string(),
            request.title.clone(),
            "-o".to_string(),
            format!("media={}", attrs.media()),
            "-o".to_string(),
            format!("orientation-requested={}", attrs.orientation_requested()),
            "-o".to_string(),
            format!("print-color-mode={}", attrs.print_color_mode()),
            "-o".to_string(),
            format!("print-quality={}", attrs.print_quality()),
            "--".to_string(),
            request.file.to_string_lossy().into_owned(),
        ]
    }
}

static JOB_ID_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"request id is (\S+)").ok());

fn parse_job_id(stdout: &str) -> Option<String> {
    JOB_ID_RE
        .as_ref()?
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl PrintSpooler for LpSpooler {
    fn name(&self) -> &str {
        "lp"
    }

    async fn submit(&self, request: SpoolRequest) -> Result<SpoolReceipt, SpoolError> {
        let args = Self::build_args(&request);
        debug!(command = %self.lp_command, ?args, "Submitting print job");

        let child = Command::new(&self.lp_command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpoolError::CommandNotFound {
                        command: self.lp_command.clone(),
                    }
                } else {
                    SpoolError::Io(e)
                }
            })?;

        let output = match timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(printer = %request.printer, "Print submission timed out");
                return Err(SpoolError::Timeout {
                    timeout_secs: self.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SpoolError::Rejected {
                reason: if stderr.is_empty() {
                    format!("lp exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = parse_job_id(&stdout);
        info!(printer = %request.printer, job_id = ?job_id, "Print job accepted");

        Ok(SpoolReceipt {
            printer: request.printer,
            job_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{ColorMode, Orientation, PaperSize, Quality};
    use std::path::PathBuf;

    fn request() -> SpoolRequest {
        SpoolRequest {
            printer: "Office".to_string(),
            file: PathBuf::from("/tmp/doc.pdf"),
            title: "order-1".to_string(),
            attributes: PrintAttributes {
                copies: 2,
                paper_size: PaperSize::A3,
                orientation: Orientation::Landscape,
                color_mode: ColorMode::Monochrome,
                quality: Quality::Draft,
            },
        }
    }

    #[test]
    fn test_build_args() {
        let args = LpSpooler::build_args(&request());
        let joined = args.join(" ");
        assert!(joined.starts_with("-d Office -n 2 -t order-1"));
        assert!(joined.contains("-o media=A3"));
        assert!(joined.contains("-o orientation-requested=4"));
        assert!(joined.contains("-o print-color-mode=monochrome"));
        assert!(joined.contains("-o print-quality=3"));
        assert_eq!(args.last().unwrap(), "/tmp/doc.pdf");
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(
            parse_job_id("request id is Office-42 (1 file(s))\n"),
            Some("Office-42".to_string())
        );
        assert_eq!(parse_job_id(""), None);
    }

    #[test]
    fn test_job_id_pattern_compiles() {
        assert!(JOB_ID_RE.is_some());
        assert_eq!(
            parse_job_id("request id is Photo_Color-7 (0 file(s))"),
            Some("Photo_Color-7".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_command() {
        let spooler = LpSpooler::new("definitely-not-an-lp-binary", 5);
        let result = spooler.submit(request()).await;
        assert!(matches!(result, Err(SpoolError::CommandNotFound { .. })));
    }
}
