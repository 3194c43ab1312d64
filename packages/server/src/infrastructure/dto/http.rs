//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// Query parameters of the chat shell route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
}

/// Current presence, returned by `/api/presence`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceDto {
    pub count: usize,
    pub participants: Vec<ParticipantDto>,
}

/// One connected participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    pub gender: String,
    /// RFC 3339 timestamp
    pub joined_at: String,
}
