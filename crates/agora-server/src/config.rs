//! Server configuration and credential loading.
//!
//! Precedence: compiled defaults, then environment variables, then CLI flags
//! (applied by the binary). Env values that fail strict parsing are ignored.

use serde::{Deserialize, Serialize};

/// Default Gemini model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the chat server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Capacity of the per-connection outbound frame queue.
    pub outbound_queue_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            outbound_queue_size: 64,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `AGORA_HOST` / `AGORA_PORT`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(host) = read_env_string("AGORA_HOST") {
            config.host = host;
        }
        if let Some(port) = read_env_u16("AGORA_PORT") {
            config.port = port;
        }
        config
    }
}

/// Credentials and endpoints for the two external collaborators.
///
/// Their absence is a fatal boot-time condition; nothing in the core runs
/// without them.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// Gemini API key (`GEMINI_API_KEY`).
    pub gemini_api_key: String,
    /// Gemini model name (`AGORA_GEMINI_MODEL`, optional).
    pub gemini_model: String,
    /// Backend API key (`AGORA_BACKEND_API_KEY`).
    pub backend_api_key: String,
    /// Backend base URL (`AGORA_BACKEND_BASE_URL`).
    pub backend_base_url: String,
}

/// A required startup value was missing.
#[derive(Debug, thiserror::Error)]
#[error("missing required environment variable {name}")]
pub struct MissingCredential {
    /// Name of the missing variable.
    pub name: &'static str,
}

impl Credentials {
    /// Load credentials from the environment.
    pub fn from_env() -> Result<Self, MissingCredential> {
        Ok(Self {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: read_env_string("AGORA_GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.into()),
            backend_api_key: require_env("AGORA_BACKEND_API_KEY")?,
            backend_base_url: require_env("AGORA_BACKEND_BASE_URL")?,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, MissingCredential> {
    read_env_string(name).ok_or(MissingCredential { name })
}

/// Read a non-empty string env var.
fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a port number; invalid values fall back to the default.
fn read_env_u16(name: &str) -> Option<u16> {
    std::env::var(name).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_loopback_auto_port() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
        assert_eq!(cfg.outbound_queue_size, 64);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, cfg.host);
        assert_eq!(back.port, cfg.port);
    }

    #[test]
    fn missing_credential_names_variable() {
        let err = MissingCredential {
            name: "GEMINI_API_KEY",
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
