//! REST order store client.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::OrderStoreConfig;

use super::store::{OrderFeed, OrderSnapshot, OrderStatusUpdater, OrderStoreError};
use super::types::Order;

/// Order store reachable over a JSON REST API.
///
/// - `GET {url}/orders` returns the collection, newest first
/// - `PATCH {url}/orders/{id}` with `{"orderStatus": ...}` updates one order
#[derive(Clone)]
pub struct HttpOrderStore {
    client: Client,
    config: OrderStoreConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusPatch<'a> {
    order_status: &'a str,
}

impl HttpOrderStore {
    /// Create a new client for the configured store.
    pub fn new(config: OrderStoreConfig) -> Result<Self, OrderStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| OrderStoreError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => request.bearer_auth(key),
            _ => request,
        }
    }

    /// Fetch the current order collection once.
    pub async fn fetch_orders(&self) -> Result<Vec<Order>, OrderStoreError> {
        let url = format!("{}/orders", self.base_url());
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderStoreError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let mut orders = response
            .json::<Vec<Order>>()
            .await
            .map_err(|e| OrderStoreError::ParseError(e.to_string()))?;

        // Newest first; ties keep the server's order.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

fn map_transport_error(e: reqwest::Error) -> OrderStoreError {
    if e.is_timeout() {
        OrderStoreError::Timeout
    } else {
        OrderStoreError::ConnectionFailed(e.to_string())
    }
}

impl OrderFeed for HttpOrderStore {
    fn subscribe(&self) -> BoxStream<'static, OrderSnapshot> {
        let store = self.clone();
        let interval = Duration::from_millis(self.config.poll_interval_ms.max(1));

        info!(url = %store.base_url(), "Subscribing to order feed");

        Box::pin(async_stream::stream! {
            let mut last: Option<Vec<Order>> = None;
            loop {
                match store.fetch_orders().await {
                    Ok(orders) => {
                        if last.as_ref() != Some(&orders) {
                            debug!(count = orders.len(), "Order collection changed");
                            last = Some(orders.clone());
                            yield Ok(orders);
                        }
                    }
                    Err(e) => {
                        warn!("Order feed poll failed: {}", e);
                        yield Err(e);
                    }
                }
                tokio::time::sleep(interval).await;
            }
        })
    }
}

#[async_trait]
impl OrderStatusUpdater for HttpOrderStore {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: &str,
    ) -> Result<(), OrderStoreError> {
        let url = format!(
            "{}/orders/{}",
            self.base_url(),
            urlencoding::encode(order_id)
        );

        let response = self
            .authorize(self.client.patch(&url))
            .json(&StatusPatch {
                order_status: status,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let code = response.status();
        if !code.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderStoreError::Api {
                status: code.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        info!(order_id, status, "Order status updated");
        Ok(())
    }
}
