//! Download API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use autoprint_core::DownloadSnapshot;

use super::queue::{ErrorResponse, MessageResponse};
use crate::state::AppState;

type HandlerResult = Result<(StatusCode, Json<MessageResponse>), (StatusCode, Json<ErrorResponse>)>;

fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message }))
}

/// Download state of every tracked order
pub async fn list_downloads(State(state): State<Arc<AppState>>) -> Json<DownloadSnapshot> {
    Json(state.shop().downloads().snapshot().as_ref().clone())
}

/// Restart a failed download
pub async fn retry_download(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> HandlerResult {
    let shop = state.shop();
    if shop.orders().find(&order_id).is_none() {
        return Err(error(
            StatusCode::NOT_FOUND,
            format!("Order not found: {}", order_id),
        ));
    }

    if shop.retry_download(&order_id) {
        Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse {
                message: format!("Download restarted for {}", order_id),
            }),
        ))
    } else {
        Err(error(
            StatusCode::CONFLICT,
            format!("Download of {} is not in a retryable state", order_id),
        ))
    }
}

/// Abort an in-flight download
pub async fn cancel_download(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> HandlerResult {
    if state.shop().cancel_download(&order_id) {
        Ok((
            StatusCode::OK,
            Json(MessageResponse {
                message: format!("Download cancelled for {}", order_id),
            }),
        ))
    } else {
        Err(error(
            StatusCode::NOT_FOUND,
            format!("No active download for {}", order_id),
        ))
    }
}
