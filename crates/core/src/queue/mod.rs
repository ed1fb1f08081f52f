//! Print queue.
//!
//! Per-order state machine:
//!
//! ```text
//! WAITING -> PRINTING -> COMPLETED | FAILED
//!    |          |
//!    +----------+-------> CANCELLED
//! ```
//!
//! A missing document fails a WAITING order directly. Terminal entries stay
//! until [`PrintQueue::clear_completed_jobs`].

mod config;
mod runner;
mod status;
mod types;

pub use config::QueueConfig;
pub use runner::PrintQueue;
pub use status::{StatusBoard, StatusFeed};
pub use types::{
    PrintJobStatus, PrintStatus, StatusSnapshot, CANCELLED_MESSAGE, FILE_NOT_FOUND_MESSAGE,
    PRINTING_MESSAGE, WAITING_MESSAGE,
};
