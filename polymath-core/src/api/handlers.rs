//! Request handlers and wire payloads.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};
use crate::chain::TopicChain;
use crate::error::ChainError;
use crate::session::{run_mind_map, run_related_topics, run_research};
use crate::types::{MindMap, RelatedTopic, ResearchOutput};

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub primary_topic: String,
    pub intent_topic: String,
    #[serde(default)]
    pub previous_topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub research_output: ResearchOutput,
    pub related_topics: Vec<RelatedTopic>,
    pub connection_path: String,
}

#[derive(Debug, Deserialize)]
pub struct ContinueResearchRequest {
    pub topics: Vec<String>,
    pub next_topic: String,
}

#[derive(Debug, Deserialize)]
pub struct RelatedTopicsRequest {
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RelatedTopicsResponse {
    pub related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
pub struct MindMapRequest {
    pub primary_topic: String,
    #[serde(default)]
    pub secondary_topics: Vec<String>,
}

pub(super) async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Polymath research API"
    }))
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "api_version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Research a connection between two topics, optionally carrying topics
/// from earlier rounds.
pub(super) async fn research(
    State(state): State<AppState>,
    Json(req): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let mut topics = vec![req.primary_topic, req.intent_topic];
    topics.extend(req.previous_topics);
    let chain = TopicChain::from_topics(topics)?;

    info!(path = %chain.display_path(), "research request");
    let result = run_research(state.gateway.as_ref(), chain.topics()).await?;

    Ok(Json(ResearchResponse {
        research_output: result.research_output,
        related_topics: result.related_topics,
        connection_path: chain.display_path(),
    }))
}

/// Extend an existing chain with one more topic and regenerate research.
/// The request must carry at least the anchor pair.
pub(super) async fn continue_research(
    State(state): State<AppState>,
    Json(req): Json<ContinueResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiError> {
    if req.topics.len() < 2 {
        return Err(ChainError::NotEnoughTopics {
            needed: 2,
            got: req.topics.len(),
        }
        .into());
    }
    let mut chain = TopicChain::from_topics(req.topics)?;
    chain.push(req.next_topic)?;

    info!(path = %chain.display_path(), "continue-research request");
    let result = run_research(state.gateway.as_ref(), chain.topics()).await?;

    Ok(Json(ResearchResponse {
        research_output: result.research_output,
        related_topics: result.related_topics,
        connection_path: chain.display_path(),
    }))
}

/// Suggest related topics for a chain of one or more topics.
pub(super) async fn related_topics(
    State(state): State<AppState>,
    Json(req): Json<RelatedTopicsRequest>,
) -> Result<Json<RelatedTopicsResponse>, ApiError> {
    let chain = TopicChain::from_topics(req.topics)?;
    info!(path = %chain.display_path(), "related-topics request");
    let related = run_related_topics(state.gateway.as_ref(), chain.topics()).await?;
    Ok(Json(RelatedTopicsResponse {
        related_topics: related,
    }))
}

/// Generate a node/edge mind map for a primary topic and its connections.
pub(super) async fn mind_map(
    State(state): State<AppState>,
    Json(req): Json<MindMapRequest>,
) -> Result<Json<MindMap>, ApiError> {
    let mut topics = vec![req.primary_topic];
    topics.extend(req.secondary_topics);
    let chain = TopicChain::from_topics(topics)?;

    info!(path = %chain.display_path(), "mind-map request");
    let map = run_mind_map(state.gateway.as_ref(), chain.topics()).await?;
    Ok(Json(map))
}
