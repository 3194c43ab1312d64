//! Infrastructure layer: concrete implementations of the domain seams.

pub mod connection;
pub mod dto;
pub mod registry;
pub mod renderer;
