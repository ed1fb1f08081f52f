//! Order store abstraction.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use super::types::Order;

/// Errors talking to the remote order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// Could not reach the store.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Store answered with an error status.
    #[error("order store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// One item of the live order feed: the complete current order collection,
/// newest first, or a transient error.
pub type OrderSnapshot = Result<Vec<Order>, OrderStoreError>;

/// Live subscription to the order collection.
pub trait OrderFeed: Send + Sync {
    /// Subscribe to the collection. Every item is the full current list.
    /// Dropping the stream unsubscribes.
    fn subscribe(&self) -> BoxStream<'static, OrderSnapshot>;
}

/// Writes status transitions back to the order store.
#[async_trait]
pub trait OrderStatusUpdater: Send + Sync {
    /// Request a status transition for an order.
    async fn update_order_status(&self, order_id: &str, status: &str)
        -> Result<(), OrderStoreError>;
}
