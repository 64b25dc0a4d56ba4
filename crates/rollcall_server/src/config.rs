//! Server configuration.

use rollcall_core::Config;
use std::env;
use std::net::SocketAddr;

/// Environment variable holding the listen address.
pub const BIND_ADDR_ENV: &str = "ROLLCALL_BIND_ADDR";

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Document store configuration.
    pub store: Config,
}

impl ServerConfig {
    /// Creates a new server configuration with the default store settings.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            store: Config::default(),
        }
    }

    /// Reads `ROLLCALL_BIND_ADDR` and the store variables, falling back to
    /// defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self {
            store: Config::from_env(),
            ..Self::default()
        };

        if let Ok(raw) = env::var(BIND_ADDR_ENV) {
            match raw.trim().parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!("Invalid {BIND_ADDR_ENV} value {raw:?}: {e}"),
            }
        }

        config
    }

    /// Sets the store configuration.
    pub fn with_store(mut self, store: Config) -> Self {
        self.store = store;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}
