//! Research sessions: the topic chain, the latest structured result, and
//! the history of abandoned research paths.
//!
//! A session is explicit owned state; there is no process-wide singleton,
//! and concurrent sessions share only the gateway handle. Every operation
//! that talks to the model builds its prompt from a prospective topic list
//! and commits the chain only after the round trip succeeds, so a failed
//! call never leaves a partial append behind.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chain::TopicChain;
use crate::error::{ChainError, Result};
use crate::extract::extract;
use crate::gateway::{GatewayRequest, ModelGateway};
use crate::prompt::{PromptKind, build_prompt};
use crate::types::{MindMap, RelatedTopic, ResearchResult, SessionResult};

/// Run one research round trip over an ordered topic list.
///
/// The first two topics are the anchor; the rest are supplied to the model
/// as previous topics so established connections are preserved.
pub async fn run_research(
    gateway: &dyn ModelGateway,
    topics: &[String],
) -> Result<ResearchResult> {
    let prompt = build_prompt(PromptKind::Research, topics)?;
    let request = GatewayRequest::from_prompt(prompt, PromptKind::Research.sampling());
    let response = gateway.complete(request).await?;
    debug!(
        model = %response.model,
        tokens = response.usage.total(),
        "research round trip complete"
    );
    Ok(extract(&response.text)?)
}

/// Run one related-topics round trip. Never mutates anything.
pub async fn run_related_topics(
    gateway: &dyn ModelGateway,
    topics: &[String],
) -> Result<Vec<RelatedTopic>> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        related_topics: Vec<RelatedTopic>,
    }

    let prompt = build_prompt(PromptKind::RelatedTopics, topics)?;
    let request = GatewayRequest::from_prompt(prompt, PromptKind::RelatedTopics.sampling());
    let response = gateway.complete(request).await?;
    let payload: Payload = extract(&response.text)?;
    Ok(payload.related_topics)
}

/// Run one mind-map round trip over an ordered topic list.
pub async fn run_mind_map(gateway: &dyn ModelGateway, topics: &[String]) -> Result<MindMap> {
    let prompt = build_prompt(PromptKind::MindMap, topics)?;
    let request = GatewayRequest::from_prompt(prompt, PromptKind::MindMap.sampling());
    let response = gateway.complete(request).await?;
    let map: MindMap = extract(&response.text)?;
    map.warn_dangling_edges();
    Ok(map)
}

/// One interactive research session.
pub struct ResearchSession {
    id: Uuid,
    chain: TopicChain,
    current: Option<SessionResult>,
    history: Vec<String>,
    created_at: DateTime<Utc>,
    gateway: Arc<dyn ModelGateway>,
}

impl std::fmt::Debug for ResearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchSession")
            .field("id", &self.id)
            .field("chain", &self.chain)
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl ResearchSession {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chain: TopicChain::new(),
            current: None,
            history: Vec::new(),
            created_at: Utc::now(),
            gateway,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn chain(&self) -> &TopicChain {
        &self.chain
    }

    /// The most recent structured result, if any round trip has succeeded.
    pub fn current(&self) -> Option<&SessionResult> {
        self.current.as_ref()
    }

    /// Display paths of previously abandoned chains, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The active chain rendered as a connection path.
    pub fn connection_path(&self) -> String {
        self.chain.display_path()
    }

    /// Start a new chain with a primary and an intent topic, generating the
    /// first research output. Valid only from the empty state.
    pub async fn start(
        &mut self,
        primary: impl Into<String>,
        intent: impl Into<String>,
    ) -> Result<ResearchResult> {
        // Validate the transition on a staging copy; the live chain mutates
        // only after the round trip succeeds.
        let mut staged = self.chain.clone();
        staged.start(primary, intent)?;

        let result = run_research(self.gateway.as_ref(), staged.topics()).await?;
        info!(session = %self.id, path = %staged.display_path(), "research chain started");

        self.chain = staged;
        self.current = Some(SessionResult::Research(result.clone()));
        Ok(result)
    }

    /// Append a topic to the chain and regenerate the research output.
    /// Valid from paired or extended states.
    pub async fn extend(&mut self, next: impl Into<String>) -> Result<ResearchResult> {
        let mut staged = self.chain.clone();
        staged.push(next)?;

        let result = run_research(self.gateway.as_ref(), staged.topics()).await?;
        info!(session = %self.id, path = %staged.display_path(), "research chain extended");

        self.chain = staged;
        self.current = Some(SessionResult::Research(result.clone()));
        Ok(result)
    }

    /// Suggest topics that would expand the current chain. Side query:
    /// never mutates the chain or the stored result.
    pub async fn related_topics(&self) -> Result<Vec<RelatedTopic>> {
        if self.chain.is_empty() {
            return Err(ChainError::InvalidState {
                operation: "related_topics".to_string(),
                state: self.chain.state().to_string(),
            }
            .into());
        }
        run_related_topics(self.gateway.as_ref(), self.chain.topics()).await
    }

    /// Generate a node/edge mind map over the current chain and store it as
    /// the session's result. The chain itself is not mutated.
    pub async fn mind_map(&mut self) -> Result<MindMap> {
        let map = run_mind_map(self.gateway.as_ref(), self.chain.topics()).await?;
        self.current = Some(SessionResult::MindMap(map.clone()));
        Ok(map)
    }

    /// Abandon the current chain: record its display path in history
    /// (deduplicated by exact string match) and clear chain and result.
    pub fn reset(&mut self) {
        if !self.chain.is_empty() {
            let path = self.chain.display_path();
            if !self.history.contains(&path) {
                self.history.push(path);
            }
        }
        self.chain.clear();
        self.current = None;
    }

    /// Write the last structured result to `path` as pretty-printed JSON.
    ///
    /// A convenience side artifact; nothing ever reads it back.
    pub fn export_result(&self, path: &Path) -> Result<()> {
        let current = self.current.as_ref().ok_or_else(|| ChainError::InvalidState {
            operation: "export".to_string(),
            state: "no result".to_string(),
        })?;
        let json = serde_json::to_string_pretty(current)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "exported session result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainState;
    use crate::error::{GatewayError, PolymathError};
    use crate::gateway::MockGateway;

    const RESEARCH_JSON: &str = r#"```json
{
    "research_output": {
        "title": "Connecting Coffee and Politics: A Multidisciplinary Exploration",
        "introduction": "Coffee has shaped political discourse for centuries.",
        "connections": [{
            "discipline": "History",
            "explanation": "Coffeehouses as sites of debate.",
            "subtopics": [{"name": "Penny universities", "details": "London, 17th century"}],
            "themes": ["Public sphere"]
        }],
        "research_questions": ["How did coffeehouses shape civic discourse?"],
        "cross_cutting_themes": ["Trade and power"],
        "mind_map": {"central_themes": "Coffee, Politics", "key_connections": []}
    },
    "related_topics": [
        {"topic": "Colonialism", "relevance": "Plantation economies"},
        {"topic": "Gender", "relevance": "Labor and exclusion"},
        {"topic": "Globalization", "relevance": "Commodity chains"}
    ]
}
```"#;

    const RELATED_JSON: &str =
        r#"{"related_topics": [{"topic": "Trade", "relevance": "Commodity flows"}]}"#;

    const MIND_MAP_JSON: &str = r#"```json
{
    "nodes": [
        {"id": "coffee", "label": "Coffee", "group": "primary", "description": "The bean"},
        {"id": "politics", "label": "Politics", "group": "political science", "description": ""}
    ],
    "edges": [{"from": "coffee", "to": "politics", "label": "fuels", "description": ""}],
    "related_topics": [{"topic": "Colonialism", "relevance": "Plantations"}]
}
```"#;

    fn session_with(mock: MockGateway) -> ResearchSession {
        ResearchSession::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_start_then_extend_builds_the_chain() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(RESEARCH_JSON);
        let mut session = session_with(mock);

        let result = session.start("Coffee", "Politics").await.unwrap();
        assert_eq!(
            result.research_output.title,
            "Connecting Coffee and Politics: A Multidisciplinary Exploration"
        );
        assert_eq!(session.chain().topics(), ["Coffee", "Politics"]);

        session.extend("Gender").await.unwrap();
        assert_eq!(session.chain().topics(), ["Coffee", "Politics", "Gender"]);
        assert_eq!(session.connection_path(), "Coffee → Politics → Gender");
        assert_eq!(session.chain().state(), ChainState::Extended);
    }

    #[tokio::test]
    async fn test_extend_on_empty_chain_fails_without_mutation() {
        let mock = MockGateway::with_response(RESEARCH_JSON);
        let mut session = session_with(mock);

        let err = session.extend("Gender").await.unwrap_err();
        assert!(matches!(
            err,
            PolymathError::Chain(ChainError::InvalidState { .. })
        ));
        assert!(session.chain().is_empty());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_chain_unchanged() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(RESEARCH_JSON);
        mock.queue_failure(GatewayError::ApiRequest {
            message: "upstream down".into(),
        });
        let mut session = session_with(mock);

        session.start("Coffee", "Politics").await.unwrap();
        session.extend("Gender").await.unwrap();

        let err = session.extend("Colonialism").await.unwrap_err();
        assert!(matches!(err, PolymathError::Gateway(_)));
        assert_eq!(session.chain().topics(), ["Coffee", "Politics", "Gender"]);
    }

    #[tokio::test]
    async fn test_malformed_response_leaves_chain_unchanged() {
        let mock = MockGateway::new();
        mock.queue_response("this is not json at all");
        let mut session = session_with(mock);

        let err = session.start("Coffee", "Politics").await.unwrap_err();
        assert!(matches!(err, PolymathError::Extract(_)));
        assert!(session.chain().is_empty());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_reset_records_history_once() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        let mut session = session_with(mock);

        session.start("Coffee", "Politics").await.unwrap();
        session.reset();
        assert!(session.chain().is_empty());
        assert!(session.current().is_none());
        assert_eq!(session.history(), ["Coffee → Politics"]);

        // A second reset with no intervening start records nothing new
        session.reset();
        assert_eq!(session.history(), ["Coffee → Politics"]);
    }

    #[tokio::test]
    async fn test_reset_deduplicates_identical_paths() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(RESEARCH_JSON);
        let mut session = session_with(mock);

        session.start("Coffee", "Politics").await.unwrap();
        session.reset();
        session.start("Coffee", "Politics").await.unwrap();
        session.reset();
        assert_eq!(session.history(), ["Coffee → Politics"]);
    }

    #[tokio::test]
    async fn test_related_topics_does_not_mutate_chain() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(RELATED_JSON);
        let mut session = session_with(mock);

        session.start("Coffee", "Politics").await.unwrap();
        let suggestions = session.related_topics().await.unwrap();
        assert_eq!(suggestions[0].topic, "Trade");
        assert_eq!(session.chain().topics(), ["Coffee", "Politics"]);
        // The stored result is untouched by the side query
        assert!(matches!(
            session.current(),
            Some(SessionResult::Research(_))
        ));
    }

    #[tokio::test]
    async fn test_related_topics_on_empty_session_is_invalid() {
        let mock = MockGateway::with_response(RELATED_JSON);
        let session = session_with(mock);
        let err = session.related_topics().await.unwrap_err();
        assert!(matches!(
            err,
            PolymathError::Chain(ChainError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_mind_map_stores_result_without_touching_chain() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(MIND_MAP_JSON);
        let mut session = session_with(mock);

        session.start("Coffee", "Politics").await.unwrap();
        let map = session.mind_map().await.unwrap();
        assert_eq!(map.nodes.len(), 2);
        assert_eq!(session.chain().topics(), ["Coffee", "Politics"]);
        assert!(matches!(session.current(), Some(SessionResult::MindMap(_))));
    }

    #[tokio::test]
    async fn test_extend_sends_anchor_and_previous_topics() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(RESEARCH_JSON);
        mock.queue_response(RESEARCH_JSON);
        let mut session = ResearchSession::new(mock.clone());

        session.start("Coffee", "Politics").await.unwrap();
        session.extend("Gender").await.unwrap();
        session.extend("Colonialism").await.unwrap();

        // The last prompt the gateway saw keeps the anchor pair fixed and
        // carries every later topic as a previous topic.
        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        let last = &requests[2].user_prompt;
        assert!(last.contains("Coffee"));
        assert!(last.contains("Politics"));
        assert!(last.contains("previous topics"));
        assert!(last.contains("Gender"));
        assert!(last.contains("Colonialism"));
    }

    #[tokio::test]
    async fn test_export_result_writes_json() {
        let mock = MockGateway::new();
        mock.queue_response(RESEARCH_JSON);
        let mut session = session_with(mock);
        session.start("Coffee", "Politics").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("research_output.json");
        session.export_result(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            value["research_output"]["title"],
            "Connecting Coffee and Politics: A Multidisciplinary Exploration"
        );
    }

    #[tokio::test]
    async fn test_export_without_result_fails() {
        let session = session_with(MockGateway::new());
        let dir = tempfile::tempdir().unwrap();
        let err = session
            .export_result(&dir.path().join("out.json"))
            .unwrap_err();
        assert!(matches!(err, PolymathError::Chain(_)));
    }
}
