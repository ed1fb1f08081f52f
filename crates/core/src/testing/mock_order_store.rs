//! Mock order store for testing.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, RwLock};

use crate::order::{Order, OrderFeed, OrderSnapshot, OrderStatusUpdater, OrderStoreError};

#[derive(Debug, Clone)]
enum FeedItem {
    Orders(Vec<Order>),
    Error(String),
}

/// A recorded status update for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub order_id: String,
    pub status: String,
}

/// Mock implementation of the OrderFeed and OrderStatusUpdater traits.
///
/// Behaves like a live store: by default a status update is applied to the
/// current collection and a new snapshot is pushed to every subscriber.
///
/// # Example
///
/// ```rust,ignore
/// use autoprint_core::testing::{fixtures, MockOrderStore};
///
/// let store = MockOrderStore::new();
/// store.set_orders(vec![fixtures::submitted_order("o1", url)]);
///
/// // Run the shop...
///
/// let updates = store.recorded_updates().await;
/// assert_eq!(updates[0].status, "QUEUED");
/// ```
#[derive(Debug)]
pub struct MockOrderStore {
    current: Arc<Mutex<Option<Vec<Order>>>>,
    feed_tx: broadcast::Sender<FeedItem>,
    /// Recorded status updates.
    updates: Arc<RwLock<Vec<RecordedUpdate>>>,
    /// If set, the next update will fail with this error.
    next_error: Arc<RwLock<Option<OrderStoreError>>>,
    /// Whether updates are applied to the collection.
    apply_updates: Arc<RwLock<bool>>,
}

impl Default for MockOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderStore {
    /// Create a new mock store with no orders published yet.
    pub fn new() -> Self {
        let (feed_tx, _) = broadcast::channel(64);
        Self {
            current: Arc::new(Mutex::new(None)),
            feed_tx,
            updates: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            apply_updates: Arc::new(RwLock::new(true)),
        }
    }

    /// Replace the collection and push it to subscribers.
    pub fn set_orders(&self, orders: Vec<Order>) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(orders.clone());
        }
        let _ = self.feed_tx.send(FeedItem::Orders(orders));
    }

    /// Current collection.
    pub fn orders(&self) -> Vec<Order> {
        self.current
            .lock()
            .ok()
            .and_then(|current| current.clone())
            .unwrap_or_default()
    }

    /// Push a feed error to subscribers.
    pub fn push_error(&self, message: &str) {
        let _ = self.feed_tx.send(FeedItem::Error(message.to_string()));
    }

    /// Get all recorded status updates.
    pub async fn recorded_updates(&self) -> Vec<RecordedUpdate> {
        self.updates.read().await.clone()
    }

    /// Configure the next update to fail with the given error.
    pub async fn set_next_error(&self, error: OrderStoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Enable or disable applying updates to the collection.
    pub async fn set_apply_updates(&self, apply: bool) {
        *self.apply_updates.write().await = apply;
    }
}

impl OrderFeed for MockOrderStore {
    fn subscribe(&self) -> BoxStream<'static, OrderSnapshot> {
        let mut rx = self.feed_tx.subscribe();
        let initial = self.current.lock().ok().and_then(|current| current.clone());

        Box::pin(async_stream::stream! {
            if let Some(orders) = initial {
                yield Ok(orders);
            }
            loop {
                match rx.recv().await {
                    Ok(FeedItem::Orders(orders)) => yield Ok(orders),
                    Ok(FeedItem::Error(message)) => {
                        yield Err(OrderStoreError::ConnectionFailed(message))
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[async_trait]
impl OrderStatusUpdater for MockOrderStore {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: &str,
    ) -> Result<(), OrderStoreError> {
        self.updates.write().await.push(RecordedUpdate {
            order_id: order_id.to_string(),
            status: status.to_string(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if *self.apply_updates.read().await {
            let mut orders = self.orders();
            if let Some(order) = orders.iter_mut().find(|o| o.order_id == order_id) {
                order.order_status = status.to_string();
                self.set_orders(orders);
            }
        }

        Ok(())
    }
}
