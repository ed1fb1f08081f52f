//! Types for print submission.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::order::Order;

/// A document ready to be printed for an order.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub order: Order,
    /// Materialized local document.
    pub file: PathBuf,
}

/// Progress stage reported during a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintProgress {
    pub order_id: String,
    /// Human-readable stage description.
    pub stage: String,
}

/// Successful submission: the print subsystem accepted the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintReceipt {
    pub printer: String,
    pub job_id: Option<String>,
    /// Pages sent, when a custom range narrowed the document.
    pub pages: Option<Vec<u32>>,
}

impl PrintReceipt {
    /// Status message for a completed order.
    pub fn message(&self) -> String {
        format!("Document printed successfully on {}", self.printer)
    }
}
