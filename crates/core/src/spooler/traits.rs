//! Spooler trait definition.

use async_trait::async_trait;

use super::error::SpoolError;
use super::types::{SpoolReceipt, SpoolRequest};

/// Hands documents to the operating system's print subsystem.
///
/// Success means the job was accepted, not that it was physically printed.
#[async_trait]
pub trait PrintSpooler: Send + Sync {
    /// Name of this spooler backend.
    fn name(&self) -> &str;

    /// Submit a document to a printer.
    async fn submit(&self, request: SpoolRequest) -> Result<SpoolReceipt, SpoolError>;
}
