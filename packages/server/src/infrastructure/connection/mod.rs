//! 接続（トランスポート）の実装
//!
//! - `websocket`: axum の WebSocket を分割した送信側・受信側の実装
//! - `channel`: tokio の mpsc チャンネルを使ったプロセス内の実装

pub mod channel;
pub mod websocket;

pub use channel::{ChannelFrameSink, ChannelFrameSource};
pub use websocket::{WebSocketFrameSink, WebSocketFrameSource};
