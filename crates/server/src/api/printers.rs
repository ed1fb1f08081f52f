//! Printer and printer-assignment API handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::error;

use autoprint_core::{PrinterAssignment, PrinterList};

use super::queue::ErrorResponse;
use crate::state::AppState;

/// List printers known to the system
pub async fn list_printers(State(state): State<Arc<AppState>>) -> Json<PrinterList> {
    Json(state.shop().printers().await)
}

/// Get the current printer assignment
pub async fn get_assignment(State(state): State<Arc<AppState>>) -> Json<PrinterAssignment> {
    Json(state.shop().printer_assignment().await)
}

/// Persist a new printer assignment
pub async fn update_assignment(
    State(state): State<Arc<AppState>>,
    Json(assignment): Json<PrinterAssignment>,
) -> Result<Json<PrinterAssignment>, (StatusCode, Json<ErrorResponse>)> {
    match state
        .shop()
        .update_printer_assignment(assignment.clone())
        .await
    {
        Ok(()) => Ok(Json(assignment)),
        Err(e) => {
            error!("Failed to save printer assignment: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
