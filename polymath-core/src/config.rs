//! Configuration system for Polymath.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment.
//! Configuration is loaded from `polymath.toml` in the working directory (or an
//! explicit path), then overridden by `POLYMATH_`-prefixed environment variables.
//!
//! The model API key itself is deliberately NOT part of the loaded config: it is
//! resolved from the environment at first use by the gateway, so a missing key is
//! a per-call configuration error rather than a startup failure.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Top-level configuration for the Polymath service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

/// Configuration for the LLM endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier (e.g., "grok-3").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Base URL of the OpenAI-compatible API endpoint.
    pub base_url: String,
    /// Optional API key override. When set, the environment variable is not read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Transport timeout in seconds for one round trip.
    pub timeout_secs: u64,
    /// Retries after a failed round trip. The default of 0 preserves the
    /// one-request-per-call contract.
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "grok-3".to_string(),
            api_key_env: "XAI_API_KEY".to_string(),
            base_url: "https://api.x.ai/v1".to_string(),
            api_key: None,
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Configuration for the REST API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

impl ServerConfig {
    /// The socket address string to bind, e.g. "0.0.0.0:8001".
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load configuration with layering: defaults -> optional TOML file -> environment.
///
/// Environment variables use the `POLYMATH_` prefix with `__` as the section
/// separator, e.g. `POLYMATH_LLM__MODEL=grok-3`.
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::Invalid {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let default_path = Path::new("polymath.toml");
            if default_path.exists() {
                figment = figment.merge(Toml::file(default_path));
            }
        }
    }

    figment = figment.merge(Env::prefixed("POLYMATH_").split("__"));

    figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}
