use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{downloads, handlers, middleware::metrics_middleware, orders, printers, queue, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Orders
        .route("/orders", get(orders::list_orders))
        // Print queue
        .route("/queue", get(queue::get_status))
        .route("/queue/start", post(queue::start))
        .route("/queue/stop", post(queue::stop))
        .route("/queue/clear", post(queue::clear))
        // Printers
        .route("/printers", get(printers::list_printers))
        .route(
            "/settings/printers",
            get(printers::get_assignment).put(printers::update_assignment),
        )
        // Downloads
        .route("/downloads", get(downloads::list_downloads))
        .route("/downloads/{id}/retry", post(downloads::retry_download))
        .route("/downloads/{id}/cancel", post(downloads::cancel_download))
        // Live updates
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
