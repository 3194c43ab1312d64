//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{chat_page, get_presence, health_check, login_page, metrics_exposition};
pub use websocket::websocket_handler;
