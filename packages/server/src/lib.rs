//! Single-room ephemeral chat relay.
//!
//! Browsers join over WebSocket with a display name and a category, and every
//! chat message or presence change is rendered as an HTML fragment and pushed
//! to all currently joined participants. Nothing is persisted.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod metrics;

#[cfg(test)]
mod test_support;
