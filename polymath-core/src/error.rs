//! Error types for the Polymath core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering configuration, gateway, extraction, and chain-state domains.

/// Top-level error type for the Polymath core library.
#[derive(Debug, thiserror::Error)]
pub enum PolymathError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from model gateway round trips.
///
/// Upstream failures carry the provider's message verbatim; they are
/// reported to the caller and never retried implicitly.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },

    #[error("Empty completion: the model returned no choices")]
    EmptyCompletion,
}

/// Errors from JSON extraction of model output.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The extracted text failed to parse as JSON. The raw model output
    /// is kept for diagnostics.
    #[error("Malformed model response: {message}")]
    Malformed { message: String, raw: String },
}

/// Errors from topic-chain state transitions.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid chain state for {operation}: chain is {state}")]
    InvalidState { operation: String, state: String },

    #[error("Topic must be a non-empty string")]
    EmptyTopic,

    #[error("Not enough topics: need at least {needed}, got {got}")]
    NotEnoughTopics { needed: usize, got: usize },
}

/// A type alias for results using the top-level `PolymathError`.
pub type Result<T> = std::result::Result<T, PolymathError>;
