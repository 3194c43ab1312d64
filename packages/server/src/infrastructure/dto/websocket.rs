//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// First frame on a new connection.
///
/// Absent fields decode as empty strings so they are reported as missing
/// rather than malformed.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct JoinRequestDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
}

/// Chat message frame sent after the join handshake.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessageDto {
    /// Display name claimed by the client. The server uses the participant's own name.
    #[serde(default)]
    pub name: String,
    pub message: String,
    /// Headers of the originating HTMX request, passed through uninterpreted.
    #[serde(rename = "HEADERS", default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HtmxHeadersDto>,
}

/// HTMX request headers mirrored into `ws-send` payloads.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HtmxHeadersDto {
    #[serde(rename = "HX-Request", default)]
    pub request: Option<String>,
    #[serde(rename = "HX-Trigger", default)]
    pub trigger: Option<String>,
    #[serde(rename = "HX-Trigger-Name", default)]
    pub trigger_name: Option<String>,
    #[serde(rename = "HX-Target", default)]
    pub target: Option<String>,
    #[serde(rename = "HX-Current-URL", default)]
    pub current_url: Option<String>,
}

/// Error frame sent before closing a rejected connection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorFrameDto {
    pub error: String,
}
