//! Types for the print queue.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message of every order seeded into a run.
pub const WAITING_MESSAGE: &str = "Waiting in queue...";
/// Message of an order when its submission starts.
pub const PRINTING_MESSAGE: &str = "Starting print job...";
/// Message of orders cancelled by a stop request.
pub const CANCELLED_MESSAGE: &str = "Cancelled by user";
/// Message of orders with no materialized document.
pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found";

/// Status of one order in the print queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintStatus {
    Waiting,
    Printing,
    Completed,
    Failed,
    Cancelled,
}

impl PrintStatus {
    /// Completed, failed and cancelled entries never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Waiting or printing.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: PrintStatus) -> bool {
        match (self, next) {
            (Self::Waiting, Self::Printing) => true,
            (Self::Waiting, Self::Failed) => true,
            (Self::Waiting, Self::Cancelled) => true,
            (Self::Printing, Self::Completed) => true,
            (Self::Printing, Self::Failed) => true,
            (Self::Printing, Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Lowercase label used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Printing => "printing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Status entry of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobStatus {
    pub order_id: String,
    pub status: PrintStatus,
    pub message: String,
    /// Latest submission stage, only set while printing.
    pub progress: String,
    /// Run that admitted this entry.
    pub run: u64,
    pub updated_at: DateTime<Utc>,
}

impl PrintJobStatus {
    pub(crate) fn new(order_id: &str, status: PrintStatus, message: &str, run: u64) -> Self {
        Self {
            order_id: order_id.to_string(),
            status,
            message: message.to_string(),
            progress: String::new(),
            run,
            updated_at: Utc::now(),
        }
    }
}

/// Immutable view of the queue, replaced on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Incremented on every change.
    pub version: u64,
    /// Latest run id (0 before the first run).
    pub run: u64,
    /// Whether a run is active.
    pub running: bool,
    pub jobs: HashMap<String, PrintJobStatus>,
}

impl StatusSnapshot {
    pub fn get(&self, order_id: &str) -> Option<&PrintJobStatus> {
        self.jobs.get(order_id)
    }

    /// Number of entries with the given status.
    pub fn count(&self, status: PrintStatus) -> usize {
        self.jobs.values().filter(|job| job.status == status).count()
    }
}
