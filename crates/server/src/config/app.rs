//! Application configuration for the Quorum server.

use serde::Deserialize;

/// Which document store backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgreSQL-backed store.
    #[default]
    Postgres,
    /// In-memory store (single process, no persistence across restarts).
    Memory,
}

/// Application configuration loaded from environment variables.
///
/// Environment variables are prefixed with `QUORUM_`:
/// - `QUORUM_HOST`: Server bind address (default: "0.0.0.0")
/// - `QUORUM_PORT`: Server port (default: 8090)
/// - `QUORUM_STORE`: Store backend, `postgres` or `memory` (default: postgres)
/// - `QUORUM_NATS_URL`: NATS URL for change-event publishing (optional)
/// - `QUORUM_MAIL_RELAY_URL`: HTTP mail relay endpoint (optional; log-only
///   delivery when unset)
/// - `QUORUM_DEBUG`: Enable debug mode (default: false)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Store backend
    #[serde(default)]
    pub store: StoreBackend,

    /// Enable debug mode
    #[serde(default)]
    pub debug: bool,

    /// Server name for identification
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// NATS URL (optional)
    #[serde(default)]
    pub nats_url: Option<String>,

    /// Mail relay URL (optional)
    #[serde(default)]
    pub mail_relay_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_server_name() -> String {
    "quorum-server".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `QUORUM_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("QUORUM_").from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store: StoreBackend::default(),
            debug: false,
            server_name: default_server_name(),
            nats_url: None,
            mail_relay_url: None,
        }
    }
}
