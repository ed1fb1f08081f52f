//! Print queue API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use autoprint_core::StatusSnapshot;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for clearing finished jobs
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the queue status snapshot
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.shop().queue().status().as_ref().clone())
}

/// Print every ready order
pub async fn start(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<MessageResponse>), impl IntoResponse> {
    let shop = state.shop();
    if shop.start_printing().await {
        return Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse {
                message: "Print queue started".to_string(),
            }),
        ));
    }

    let (status, error) = if !shop.printer_assignment().await.is_configured() {
        (
            StatusCode::PRECONDITION_FAILED,
            "Printer settings not configured",
        )
    } else if shop.queue().is_running() {
        (StatusCode::CONFLICT, "Print queue already running")
    } else {
        (StatusCode::CONFLICT, "No orders ready to print")
    };

    Err((
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    ))
}

/// Stop the active run
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.shop().stop_printing();
    Json(MessageResponse {
        message: "Print queue stopped".to_string(),
    })
}

/// Drop finished entries
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    Json(ClearResponse {
        removed: state.shop().clear_completed_jobs(),
    })
}
