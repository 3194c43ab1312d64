//! WebSocket を使った FrameSink / FrameSource 実装
//!
//! ## 設計ノート
//!
//! WebSocket の生成（アップグレード）は UI 層で行われます。
//! UI 層はソケットを `split()` し、送信側を `WebSocketFrameSink`、
//! 受信側を `WebSocketFrameSource` として Presence Lifecycle に渡します。

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{FrameSink, FrameSource, TransportError};

/// WebSocket の送信側
pub struct WebSocketFrameSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WebSocketFrameSink {
    pub fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl FrameSink for WebSocketFrameSink {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        self.sender
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sender
            .close()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// WebSocket の受信側
pub struct WebSocketFrameSource {
    receiver: SplitStream<WebSocket>,
}

impl WebSocketFrameSource {
    pub fn new(receiver: SplitStream<WebSocket>) -> Self {
        Self { receiver }
    }
}

#[async_trait]
impl FrameSource for WebSocketFrameSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(msg) = self.receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            };

            match msg {
                Message::Text(text) => return Some(Ok(text.as_str().to_owned())),
                // Binary frames go through the same JSON parsing as text
                Message::Binary(data) => {
                    return Some(Ok(String::from_utf8_lossy(&data).into_owned()));
                }
                Message::Close(_) => {
                    tracing::debug!("Peer requested close");
                    return None;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
        None
    }
}
