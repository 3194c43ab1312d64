//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::stream::StreamExt;

use crate::{
    infrastructure::connection::{WebSocketFrameSink, WebSocketFrameSource},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one connection's presence lifecycle on its own task.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    let outcome = state
        .presence_lifecycle
        .run(
            WebSocketFrameSource::new(receiver),
            Box::new(WebSocketFrameSink::new(sender)),
        )
        .await;

    match outcome.participant_id {
        Some(id) => tracing::debug!(
            "Session of {} ended after {} messages: {:?}",
            id,
            outcome.messages,
            outcome.end
        ),
        None => tracing::debug!("Session ended before join: {:?}", outcome.end),
    }
}
