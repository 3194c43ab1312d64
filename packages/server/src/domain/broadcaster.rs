//! Fan-out of chat events to participants.
//!
//! Delivery runs inline on the task that produced the event. Each recipient's
//! write lock is taken and released inside the loop body, so a stalled
//! recipient costs at most one write timeout and never blocks the registry or
//! the recipients after it.

use std::{sync::Arc, time::Duration};

use metrics::counter;

use crate::metrics::DELIVERY_FAILURES_TOTAL;

use super::{
    entity::Participant,
    error::{RenderError, TransportError},
    event::ChatEvent,
    registry::ParticipantRegistry,
    renderer::ViewRenderer,
    value_object::ParticipantId,
};

/// Result of delivering one event to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The event could not be rendered, so nothing was written.
    RenderFailed,
    WriteFailed(TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientDelivery {
    pub recipient: ParticipantId,
    pub outcome: DeliveryOutcome,
}

/// Per-recipient outcomes of one fan-out call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    deliveries: Vec<RecipientDelivery>,
    render_error: Option<RenderError>,
}

impl DeliveryReport {
    fn abandoned(recipients: &[Arc<Participant>], error: RenderError) -> Self {
        Self {
            deliveries: recipients
                .iter()
                .map(|recipient| RecipientDelivery {
                    recipient: recipient.id(),
                    outcome: DeliveryOutcome::RenderFailed,
                })
                .collect(),
            render_error: Some(error),
        }
    }

    pub fn deliveries(&self) -> &[RecipientDelivery] {
        &self.deliveries
    }

    /// Number of writes attempted, successful or not.
    pub fn attempts(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.outcome != DeliveryOutcome::RenderFailed)
            .count()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.outcome == DeliveryOutcome::Delivered)
            .count()
    }

    pub fn write_failures(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.outcome, DeliveryOutcome::WriteFailed(_)))
            .count()
    }

    /// Set when the whole event was abandoned before any write.
    pub fn render_error(&self) -> Option<&RenderError> {
        self.render_error.as_ref()
    }

    pub fn outcome_for(&self, id: ParticipantId) -> Option<&DeliveryOutcome> {
        self.deliveries
            .iter()
            .find(|d| d.recipient == id)
            .map(|d| &d.outcome)
    }
}

/// Payloads of one event, rendered once per distinct view.
struct RenderedEvent {
    others: String,
    own: Option<String>,
}

impl RenderedEvent {
    fn for_recipient(&self, own: bool) -> &str {
        match (&self.own, own) {
            (Some(payload), true) => payload,
            _ => &self.others,
        }
    }
}

/// Best-effort, fire-and-forget fan-out engine.
pub struct Broadcaster {
    renderer: Arc<dyn ViewRenderer>,
    write_timeout: Duration,
}

impl Broadcaster {
    pub fn new(renderer: Arc<dyn ViewRenderer>, write_timeout: Duration) -> Self {
        Self {
            renderer,
            write_timeout,
        }
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Snapshot the registry, then deliver `event` to every member of the snapshot.
    pub async fn broadcast(
        &self,
        event: &ChatEvent,
        registry: &dyn ParticipantRegistry,
    ) -> DeliveryReport {
        let recipients = registry.snapshot().await;
        self.deliver(event, &recipients).await
    }

    /// Announce the current membership size to every current member.
    ///
    /// The count is read once for the whole call.
    pub async fn broadcast_presence_count(
        &self,
        registry: &dyn ParticipantRegistry,
    ) -> DeliveryReport {
        let recipients = registry.snapshot().await;
        let count = registry.count().await;
        self.deliver(&ChatEvent::PresenceCount(count), &recipients)
            .await
    }

    /// Deliver `event` to each recipient independently.
    ///
    /// A failed write is recorded and logged; it neither stops the loop nor
    /// removes the recipient from the registry.
    pub async fn deliver(
        &self,
        event: &ChatEvent,
        recipients: &[Arc<Participant>],
    ) -> DeliveryReport {
        let rendered = match self.render(event, recipients) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!("Abandoning {} broadcast: {}", event.kind(), e);
                return DeliveryReport::abandoned(recipients, e);
            }
        };

        let sender_id = event.sender_id();
        let mut deliveries = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let own = sender_id == Some(recipient.id());
            let payload = rendered.for_recipient(own).to_string();
            let outcome = match recipient.send(payload, self.write_timeout).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(e) => {
                    counter!(DELIVERY_FAILURES_TOTAL).increment(1);
                    tracing::warn!(
                        "Failed to deliver {} to participant '{}' ({}): {}",
                        event.kind(),
                        recipient.display_name(),
                        recipient.id(),
                        e
                    );
                    DeliveryOutcome::WriteFailed(e)
                }
            };
            deliveries.push(RecipientDelivery {
                recipient: recipient.id(),
                outcome,
            });
        }

        tracing::debug!(
            "Broadcasted {} to {} recipients",
            event.kind(),
            deliveries.len()
        );

        DeliveryReport {
            deliveries,
            render_error: None,
        }
    }

    fn render(
        &self,
        event: &ChatEvent,
        recipients: &[Arc<Participant>],
    ) -> Result<RenderedEvent, RenderError> {
        let others = self.renderer.render(&event.view(false))?;
        let own = match event.sender_id() {
            Some(sender) if recipients.iter().any(|r| r.id() == sender) => {
                Some(self.renderer.render(&event.view(true))?)
            }
            _ => None,
        };
        Ok(RenderedEvent { others, own })
    }
}
