//! CUPS-backed printer directory.

use std::process::Command;

use tracing::{debug, warn};

use super::PrinterDirectory;

/// Printer directory that queries CUPS through `lpstat`.
#[derive(Debug, Clone)]
pub struct CupsPrinterDirectory {
    lpstat_command: String,
}

impl CupsPrinterDirectory {
    pub fn new(lpstat_command: impl Into<String>) -> Self {
        Self {
            lpstat_command: lpstat_command.into(),
        }
    }

    fn run(&self, arg: &str) -> Option<String> {
        match Command::new(&self.lpstat_command).arg(arg).output() {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                debug!(
                    command = %self.lpstat_command,
                    arg,
                    status = ?output.status.code(),
                    "lpstat returned non-zero status"
                );
                None
            }
            Err(e) => {
                warn!(command = %self.lpstat_command, "Failed to run lpstat: {}", e);
                None
            }
        }
    }
}

impl Default for CupsPrinterDirectory {
    fn default() -> Self {
        Self::new("lpstat")
    }
}

impl PrinterDirectory for CupsPrinterDirectory {
    fn list_printers(&self) -> Vec<String> {
        let printers = self
            .run("-e")
            .map(|out| parse_destinations(&out))
            .unwrap_or_default();
        debug!(count = printers.len(), "Enumerated printers");
        printers
    }

    fn default_printer(&self) -> Option<String> {
        self.run("-d").and_then(|out| parse_default(&out))
    }
}

/// Parse `lpstat -e` output: one destination per line.
fn parse_destinations(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `lpstat -d` output, e.g. `system default destination: Office`.
fn parse_default(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (label, name) = line.split_once(':')?;
        if !label.trim().ends_with("default destination") {
            return None;
        }
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}
