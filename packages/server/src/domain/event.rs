//! Events fanned out to participants.

use super::{
    renderer::View,
    value_object::{Category, DisplayName, MessageBody, ParticipantId, Timestamp},
};

/// Something every current participant should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessagePosted {
        sender_id: ParticipantId,
        sender_name: DisplayName,
        sender_category: Category,
        body: MessageBody,
        posted_at: Timestamp,
    },
    ParticipantJoined {
        name: DisplayName,
        category: Category,
        joined_at: Timestamp,
    },
    ParticipantLeft {
        name: DisplayName,
        category: Category,
        left_at: Timestamp,
    },
    PresenceCount(usize),
}

impl ChatEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessagePosted { .. } => "message-posted",
            Self::ParticipantJoined { .. } => "participant-joined",
            Self::ParticipantLeft { .. } => "participant-left",
            Self::PresenceCount(_) => "presence-count",
        }
    }

    /// Sender of a chat message; `None` for presence events.
    pub fn sender_id(&self) -> Option<ParticipantId> {
        match self {
            Self::MessagePosted { sender_id, .. } => Some(*sender_id),
            _ => None,
        }
    }

    /// Whether the rendered payload depends on who receives it.
    pub fn is_recipient_relative(&self) -> bool {
        self.sender_id().is_some()
    }

    /// The view a recipient sees. `own` only affects chat messages.
    pub fn view(&self, own: bool) -> View<'_> {
        match self {
            Self::MessagePosted {
                sender_name,
                sender_category,
                body,
                posted_at,
                ..
            } => View::Message {
                name: sender_name,
                category: *sender_category,
                body,
                posted_at: *posted_at,
                own,
            },
            Self::ParticipantJoined {
                name,
                category,
                joined_at,
            } => View::Joined {
                name,
                category: *category,
                at: *joined_at,
            },
            Self::ParticipantLeft {
                name,
                category,
                left_at,
            } => View::Left {
                name,
                category: *category,
                at: *left_at,
            },
            Self::PresenceCount(count) => View::PresenceCount(*count),
        }
    }
}
