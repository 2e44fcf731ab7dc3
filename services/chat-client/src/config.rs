//! Client configuration.
//!
//! Every field has a sane default; nothing is required. TOML is the sole
//! file source, matching `forwarder`'s config loading — just with a much
//! shorter required-field list, since the core has far fewer knobs.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Runtime configuration for a `ChatClient` session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Skip TLS peer verification on the chat WebSocket. Defaults to
    /// `false` — this is a development-only escape hatch, never the
    /// production default (see DESIGN.md).
    pub tls_insecure: bool,
    /// Interval between keepalive PING frames once `joined`.
    pub keepalive_interval: Duration,
    /// Timeout for the HTTP room-resolution request.
    pub resolve_timeout: Duration,
    /// Timeout for the WebSocket handshake.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            tls_insecure: false,
            keepalive_interval: Duration::from_secs(60),
            resolve_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    tls_insecure: Option<bool>,
    keepalive_interval_secs: Option<u64>,
    resolve_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn load_from_path(path: &Path) -> Result<ClientConfig, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("reading config file '{}': {}", path.display(), e)))?;
        Self::load_from_str(&text)
    }

    /// Parse configuration from a TOML string.
    pub fn load_from_str(text: &str) -> Result<ClientConfig, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = ClientConfig::default();
        Ok(ClientConfig {
            tls_insecure: raw.tls_insecure.unwrap_or(defaults.tls_insecure),
            keepalive_interval: raw
                .keepalive_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.keepalive_interval),
            resolve_timeout: raw
                .resolve_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.resolve_timeout),
            connect_timeout: raw
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("TOML parse error: {0}")]
    Parse(String),
}
