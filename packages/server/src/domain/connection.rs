//! Transport seams used by the presence lifecycle.
//!
//! A connection is split into an outbound `FrameSink`, owned by the
//! `Participant` once the join handshake succeeds, and an inbound
//! `FrameSource`, owned by the connection's own worker task.

use async_trait::async_trait;

use super::error::TransportError;

/// Outbound half of a message-framed connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame.
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError>;

    /// Close the connection. Closing twice is not an error worth reporting.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a message-framed connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next text frame.
    ///
    /// `None` means the peer closed the connection.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;
}
