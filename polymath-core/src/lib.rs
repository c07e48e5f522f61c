//! # Polymath Core
//!
//! Core library for the Polymath multidisciplinary research explorer.
//! Provides the prompt builder, the model gateway, defensive JSON
//! extraction, the topic-chain session state machine, configuration,
//! and the REST API surface.

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod prompt;
pub mod session;
pub mod types;

// Re-export commonly used types at the crate root.
pub use chain::{ChainState, PATH_SEPARATOR, TopicChain};
pub use config::{AppConfig, LlmConfig, ServerConfig, load_config};
pub use error::{
    ChainError, ConfigError, ExtractError, GatewayError, PolymathError, Result,
};
pub use extract::{extract, extract_json};
pub use gateway::{
    GatewayRequest, GatewayResponse, MockGateway, ModelGateway, OpenAiGateway, TokenUsage,
};
pub use prompt::{Prompt, PromptKind, Sampling, build_prompt};
pub use session::ResearchSession;
pub use types::{
    DisciplineConnection, MindMap, MindMapEdge, MindMapNode, RelatedTopic, ResearchOutput,
    ResearchResult, SessionResult,
};
