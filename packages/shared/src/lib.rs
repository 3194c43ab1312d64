//! Shared utilities for the Hiroba chat workspace.

pub mod logger;
pub mod time;
