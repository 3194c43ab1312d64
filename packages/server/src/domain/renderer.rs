//! View rendering seam.

use super::{
    error::RenderError,
    value_object::{Category, DisplayName, MessageBody, Timestamp},
};

/// Everything the renderer knows how to turn into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// Login form page.
    Login,
    /// Chat shell for a validated participant; `partial` omits the page layout.
    ChatShell {
        name: &'a DisplayName,
        category: Category,
        partial: bool,
    },
    /// Chat message; `own` is true when the recipient is the sender.
    Message {
        name: &'a DisplayName,
        category: Category,
        body: &'a MessageBody,
        posted_at: Timestamp,
        own: bool,
    },
    Joined {
        name: &'a DisplayName,
        category: Category,
        at: Timestamp,
    },
    Left {
        name: &'a DisplayName,
        category: Category,
        at: Timestamp,
    },
    PresenceCount(usize),
}

impl View<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::ChatShell { .. } => "chat-shell",
            Self::Message { .. } => "message",
            Self::Joined { .. } => "joined",
            Self::Left { .. } => "left",
            Self::PresenceCount(_) => "presence-count",
        }
    }
}

/// Pure rendering of a view into a transport payload.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError>;
}
