//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{JoinRejection, JoinRequest, MessageBody, Participant, validate_join};
use crate::infrastructure::dto::{
    http::ParticipantDto,
    websocket::{ChatMessageDto, ErrorFrameDto, JoinRequestDto},
};

// ========================================
// Frame → Domain
// ========================================

impl TryFrom<JoinRequestDto> for JoinRequest {
    type Error = JoinRejection;

    fn try_from(dto: JoinRequestDto) -> Result<Self, Self::Error> {
        Ok(validate_join(&dto.name, &dto.gender)?)
    }
}

/// Decode and validate the first frame of a connection.
pub fn decode_join_request(frame: &str) -> Result<JoinRequest, JoinRejection> {
    let dto: JoinRequestDto =
        serde_json::from_str(frame).map_err(|e| JoinRejection::Malformed(e.to_string()))?;
    JoinRequest::try_from(dto)
}

/// Decode a chat message frame.
pub fn decode_chat_message(frame: &str) -> Result<ChatMessageDto, serde_json::Error> {
    serde_json::from_str(frame)
}

impl From<ChatMessageDto> for MessageBody {
    fn from(dto: ChatMessageDto) -> Self {
        MessageBody::new(dto.message)
    }
}

// ========================================
// Domain → Frame / DTO
// ========================================

/// Encode the `{"error": ...}` frame for a rejected join.
pub fn encode_error_frame(rejection: &JoinRejection) -> String {
    let dto = ErrorFrameDto {
        error: rejection.wire_message().to_string(),
    };
    serde_json::to_string(&dto)
        .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, rejection.wire_message()))
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id().to_string(),
            name: participant.display_name().as_str().to_string(),
            gender: participant.category().as_str().to_string(),
            joined_at: timestamp_to_rfc3339(participant.joined_at().value()),
        }
    }
}
