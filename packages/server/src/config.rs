//! Server configuration.

use std::{path::PathBuf, time::Duration};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "localhost:8404";
/// Default directory served under `/static`.
pub const DEFAULT_STATIC_DIR: &str = "static";
/// Upper bound on a single frame write, including waiting for the write lock.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration of the chat server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind, `host:port`
    pub addr: String,
    /// Directory of static assets
    pub static_dir: PathBuf,
    /// Per-write timeout for every participant connection
    pub write_timeout: Duration,
}

impl ServerConfig {
    /// Configuration listening on `addr` with default settings otherwise.
    pub fn with_addr(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}
