//! Order book API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use autoprint_core::{DownloadState, Order};

use crate::state::AppState;

/// A pending order with its download state
#[derive(Debug, Serialize)]
pub struct PendingOrderResponse {
    pub order: Order,
    pub download: DownloadState,
    /// Whether the order would be picked up by the next start request
    pub ready: bool,
}

/// Response for the order book
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub version: u64,
    pub pending: Vec<PendingOrderResponse>,
    pub printed: Vec<Order>,
}

/// List pending and printed orders, newest first
pub async fn list_orders(State(state): State<Arc<AppState>>) -> Json<OrdersResponse> {
    let shop = state.shop();
    let book = shop.orders();
    let downloads = shop.downloads().snapshot();

    let pending = book
        .pending
        .iter()
        .map(|order| {
            let download = downloads
                .states
                .get(&order.order_id)
                .cloned()
                .unwrap_or_default();
            let ready = order.is_download_eligible() && download.completed_path().is_some();
            PendingOrderResponse {
                order: order.clone(),
                download,
                ready,
            }
        })
        .collect();

    Json(OrdersResponse {
        version: book.version,
        pending,
        printed: book.printed.clone(),
    })
}
