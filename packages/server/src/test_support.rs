//! Test helpers shared by unit tests.

use std::{sync::Arc, time::Duration};

use hiroba_shared::time::FixedClock;

use crate::{
    domain::{Broadcaster, RenderError, View, ViewRenderer},
    infrastructure::registry::InMemoryParticipantRegistry,
};

/// Fixed "now" used by use case tests.
pub const NOW: i64 = 1_672_531_200_000;

/// Renders views as short plain-text lines so assertions stay readable.
///
/// `message:<name>:<body>:<own|other>`, `joined:<name>`, `left:<name>`,
/// `presence-count:<n>`.
pub struct TextRenderer;

impl ViewRenderer for TextRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
        Ok(match view {
            View::Message {
                name, body, own, ..
            } => format!(
                "message:{}:{}:{}",
                name,
                body.as_str(),
                if *own { "own" } else { "other" }
            ),
            View::Joined { name, .. } => format!("joined:{}", name),
            View::Left { name, .. } => format!("left:{}", name),
            View::PresenceCount(count) => format!("presence-count:{}", count),
            other => other.name().to_string(),
        })
    }
}

pub fn create_registry() -> Arc<InMemoryParticipantRegistry> {
    Arc::new(InMemoryParticipantRegistry::new())
}

pub fn create_broadcaster() -> Arc<Broadcaster> {
    Arc::new(Broadcaster::new(
        Arc::new(TextRenderer),
        Duration::from_millis(200),
    ))
}

pub fn create_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(NOW))
}
