//! Domain types for research outputs, mind maps, and related-topic suggestions.
//!
//! Field names mirror the JSON schemas the model is instructed to emit.
//! Every field is default-tolerant on deserialize: the model occasionally
//! omits sections, and a missing list is not a malformed response.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A related-topic suggestion returned alongside research outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedTopic {
    pub topic: String,
    #[serde(default)]
    pub relevance: String,
}

/// One structured research round trip: the research output plus the
/// suggested next topics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchResult {
    #[serde(default)]
    pub research_output: ResearchOutput,
    #[serde(default)]
    pub related_topics: Vec<RelatedTopic>,
}

/// The discipline-tagged research output body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchOutput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub connections: Vec<DisciplineConnection>,
    #[serde(default)]
    pub research_questions: Vec<String>,
    #[serde(default)]
    pub cross_cutting_themes: Vec<String>,
    #[serde(default)]
    pub mind_map: MindMapSummary,
}

/// A connection between the topics viewed through one academic discipline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisciplineConnection {
    #[serde(default)]
    pub discipline: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub subtopics: Vec<Subtopic>,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// A specific subtopic under a disciplinary lens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subtopic {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub details: String,
}

/// The nested mind-map summary inside a research output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindMapSummary {
    #[serde(default)]
    pub central_themes: serde_json::Value,
    #[serde(default)]
    pub key_connections: Vec<KeyConnection>,
}

/// One key connection point in the mind-map summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyConnection {
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub connects_to: String,
    #[serde(default)]
    pub research_angles: serde_json::Value,
}

/// A full node/edge mind map returned by the mind-map prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindMap {
    #[serde(default)]
    pub nodes: Vec<MindMapNode>,
    #[serde(default)]
    pub edges: Vec<MindMapEdge>,
    #[serde(default)]
    pub related_topics: Vec<RelatedTopic>,
}

/// A node in the mind map, grouped by discipline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub description: String,
}

/// A labeled edge between two mind-map nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindMapEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

impl MindMap {
    /// Log edges whose endpoints don't reference a known node id.
    ///
    /// Semantic correctness of the model output is not enforced; dangling
    /// references are diagnostics, not errors. Returns the dangling count.
    pub fn warn_dangling_edges(&self) -> usize {
        let ids: std::collections::HashSet<&str> =
            self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut dangling = 0;
        for edge in &self.edges {
            if !ids.contains(edge.from.as_str()) || !ids.contains(edge.to.as_str()) {
                warn!(from = %edge.from, to = %edge.to, "mind-map edge references unknown node");
                dangling += 1;
            }
        }
        dangling
    }
}

/// The most recent structured result owned by a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionResult {
    Research(ResearchResult),
    MindMap(MindMap),
}

impl SessionResult {
    /// The related-topic suggestions carried by either result kind.
    pub fn related_topics(&self) -> &[RelatedTopic] {
        match self {
            SessionResult::Research(r) => &r.related_topics,
            SessionResult::MindMap(m) => &m.related_topics,
        }
    }
}
