//! Domain errors.

use std::time::Duration;

use thiserror::Error;

use super::value_object::{MAX_DISPLAY_NAME_CHARS, ParticipantId};

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("display name has {0} characters (expected <= {max})", max = MAX_DISPLAY_NAME_CHARS)]
    DisplayNameTooLong(usize),

    #[error("category must not be empty")]
    EmptyCategory,

    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

impl ValidationError {
    /// Whether the error stems from a field that was absent or empty.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::EmptyDisplayName | Self::EmptyCategory)
    }
}

/// Reasons a join handshake is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRejection {
    /// The first frame was not a JSON join request.
    #[error("malformed join request: {0}")]
    Malformed(String),

    /// The join request failed field validation.
    #[error("join request rejected: {0}")]
    Invalid(#[from] ValidationError),
}

impl JoinRejection {
    /// Message carried in the `{"error": ...}` frame sent back to the peer.
    pub fn wire_message(&self) -> &'static str {
        match self {
            Self::Invalid(e) if e.is_missing_field() => "missing name or gender",
            Self::Malformed(_) | Self::Invalid(_) => "invalid join request",
        }
    }
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An id generator handed out the same id twice.
    #[error("participant '{0}' is already registered")]
    DuplicateParticipant(ParticipantId),
}

/// Connection transport errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection is closed")]
    Closed,

    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to send frame: {0}")]
    Send(String),

    #[error("failed to receive frame: {0}")]
    Receive(String),
}

/// View rendering errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to render {view}: {reason}")]
pub struct RenderError {
    pub view: &'static str,
    pub reason: String,
}

impl RenderError {
    pub fn new(view: &'static str, reason: impl Into<String>) -> Self {
        Self {
            view,
            reason: reason.into(),
        }
    }
}
