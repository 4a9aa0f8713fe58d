use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::adapters::http::state::HttpState;
use crate::application::view_store::ViewStore;

pub async fn ws_handler(ws: WebSocketUpgrade, State(st): State<HttpState>) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

fn snapshot_message(views: &ViewStore) -> String {
    json!({ "type": "snapshot", "snapshot": views.snapshot() }).to_string()
}

/// Envía una instantánea y después cada evento de vista.
async fn handle_socket(mut socket: WebSocket, st: HttpState) {
    let views = st.dashboard.views.clone();
    let mut rx = views.subscribe();

    if socket.send(Message::Text(snapshot_message(&views))).await.is_err() {
        return;
    }

    loop {
        let text = match rx.recv().await {
            Ok(event) => serde_json::to_string(&event).unwrap_or_default(),
            Err(RecvError::Lagged(n)) => {
                warn!("⚠️ View socket lagged by {} events, resending snapshot", n);
                snapshot_message(&views)
            }
            Err(RecvError::Closed) => break,
        };
        if socket.send(Message::Text(text)).await.is_err() {
            break;
        }
    }
    debug!("view socket closed");
}
