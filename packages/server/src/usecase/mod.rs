//! UseCase layer: join, message, and leave transitions of a connection, and the
//! presence lifecycle that drives them.

pub mod error;
pub mod get_presence;
pub mod join_participant;
pub mod leave_participant;
pub mod presence_lifecycle;
pub mod send_message;

pub use error::JoinError;
pub use get_presence::GetPresenceUseCase;
pub use join_participant::JoinParticipantUseCase;
pub use leave_participant::{LeaveParticipantUseCase, LeaveReport};
pub use presence_lifecycle::{
    LeaveReason, PresenceLifecycle, PresenceState, SessionEnd, SessionOutcome,
};
pub use send_message::SendMessageUseCase;
