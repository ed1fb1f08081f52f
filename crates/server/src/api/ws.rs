//! WebSocket support for live status updates.
//!
//! Every client gets the current queue, download and order snapshots on
//! connect, then a fresh snapshot whenever one of them changes.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use autoprint_core::{DownloadSnapshot, StatusSnapshot};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_SENT};
use crate::state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// The print queue changed.
    QueueStatus { status: StatusSnapshot },
    /// A download started, progressed or finished.
    Downloads { downloads: DownloadSnapshot },
    /// The order feed delivered a new collection.
    Orders {
        version: u64,
        pending: usize,
        printed: usize,
        /// Orders the next start request would print
        ready: usize,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::QueueStatus { .. } => "queue_status",
            WsMessage::Downloads { .. } => "downloads",
            WsMessage::Orders { .. } => "orders",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }

    fn orders(state: &AppState) -> Self {
        let shop = state.shop();
        let book = shop.orders();
        WsMessage::Orders {
            version: book.version,
            pending: book.pending.len(),
            printed: book.printed.len(),
            ready: shop.ready_orders().len(),
        }
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut queue = state.shop().queue().subscribe();
    let mut downloads = state.shop().downloads().subscribe();
    let mut orders = state.shop().subscribe_orders();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let initial = [
            WsMessage::QueueStatus {
                status: queue.snapshot().as_ref().clone(),
            },
            WsMessage::Downloads {
                downloads: downloads.borrow_and_update().as_ref().clone(),
            },
            WsMessage::orders(&state),
        ];
        orders.mark_unchanged();

        for msg in initial {
            if !send_message(&mut sender, &msg).await {
                return;
            }
        }

        let mut heartbeat = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);

        loop {
            let msg = tokio::select! {
                Some(status) = queue.changed() => WsMessage::QueueStatus {
                    status: status.as_ref().clone(),
                },
                Ok(()) = downloads.changed() => WsMessage::Downloads {
                    downloads: downloads.borrow_and_update().as_ref().clone(),
                },
                Ok(()) = orders.changed() => {
                    orders.mark_unchanged();
                    WsMessage::orders(&state)
                }
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
                },
            };

            if !send_message(&mut sender, &msg).await {
                break;
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

/// Send one message. Returns `false` once the client is gone.
async fn send_message(sender: &mut SplitSink<WebSocket, Message>, msg: &WsMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize WsMessage: {}", e);
            return true;
        }
    };

    WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();
    if sender.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket send failed, client disconnected");
        return false;
    }
    true
}
