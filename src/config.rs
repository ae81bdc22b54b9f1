//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;

/// Default byte budget: 64 MiB.
pub const DEFAULT_MAX_BYTES: usize = 64 * 1024 * 1024;

/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget shared by all keys and values in the cache
    pub max_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a Config from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_BYTES` - Cache byte budget (default: 67108864)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            max_bytes: parse_var("MAX_BYTES").unwrap_or(DEFAULT_MAX_BYTES),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}
