//! Domain layer: value objects, the participant entity, events, and the seams
//! (transport, registry, renderer) the presence-and-broadcast hub depends on.

pub mod broadcaster;
pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod registry;
pub mod renderer;
pub mod validation;
pub mod value_object;

pub use broadcaster::{Broadcaster, DeliveryOutcome, DeliveryReport, RecipientDelivery};
pub use connection::{FrameSink, FrameSource};
pub use entity::Participant;
pub use error::{JoinRejection, RegistryError, RenderError, TransportError, ValidationError};
pub use event::ChatEvent;
pub use registry::ParticipantRegistry;
pub use renderer::{View, ViewRenderer};
pub use validation::{JoinRequest, validate_join};
pub use value_object::{
    Category, DisplayName, MAX_DISPLAY_NAME_CHARS, MessageBody, ParticipantId,
    ParticipantIdFactory, Timestamp,
};
