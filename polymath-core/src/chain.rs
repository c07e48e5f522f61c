//! The topic chain: an ordered, append-only sequence of research topics.
//!
//! A chain encodes the user's research journey. It starts empty, becomes
//! paired with the first two topics (primary + intent), and then grows one
//! topic at a time. Within a session nothing is ever removed from a chain;
//! abandoning it is a reset, which the owning session records in history.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ChainError;

/// Separator used when rendering a chain as a display path.
pub const PATH_SEPARATOR: &str = " → ";

/// Chain lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    Empty,
    Paired,
    Extended,
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainState::Empty => write!(f, "empty"),
            ChainState::Paired => write!(f, "paired"),
            ChainState::Extended => write!(f, "extended"),
        }
    }
}

/// An ordered, append-only topic sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicChain {
    topics: Vec<String>,
}

impl TopicChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain directly from an existing topic list. Used by stateless
    /// API handlers that receive the full chain in each request.
    pub fn from_topics(topics: Vec<String>) -> Result<Self, ChainError> {
        for topic in &topics {
            validate_topic(topic)?;
        }
        Ok(Self { topics })
    }

    pub fn state(&self) -> ChainState {
        // A single-topic chain can only come from `from_topics`; it cannot
        // anchor a research request, so it counts as not-yet-paired.
        match self.topics.len() {
            0 | 1 => ChainState::Empty,
            2 => ChainState::Paired,
            _ => ChainState::Extended,
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// The anchor pair: the first two topics, fixed for the chain's lifetime.
    pub fn anchor(&self) -> Option<(&str, &str)> {
        match self.topics.as_slice() {
            [primary, intent, ..] => Some((primary, intent)),
            _ => None,
        }
    }

    /// Topics beyond the anchor pair, in append order.
    pub fn previous_topics(&self) -> &[String] {
        if self.topics.len() > 2 {
            &self.topics[2..]
        } else {
            &[]
        }
    }

    /// Whether the chain already holds `topic`, compared case-insensitively.
    pub fn contains(&self, topic: &str) -> bool {
        self.topics
            .iter()
            .any(|t| t.eq_ignore_ascii_case(topic))
    }

    /// Start the chain with a primary and an intent topic.
    ///
    /// Only valid from the empty state. Case-insensitive duplicates are
    /// tolerated (they produce a degenerate prompt) but logged.
    pub fn start(
        &mut self,
        primary: impl Into<String>,
        intent: impl Into<String>,
    ) -> Result<(), ChainError> {
        if !self.is_empty() {
            return Err(ChainError::InvalidState {
                operation: "start".to_string(),
                state: self.state().to_string(),
            });
        }
        let primary = primary.into();
        let intent = intent.into();
        validate_topic(&primary)?;
        validate_topic(&intent)?;
        if primary.eq_ignore_ascii_case(&intent) {
            warn!(topic = %primary, "primary and intent topics are duplicates");
        }
        self.topics.push(primary);
        self.topics.push(intent);
        Ok(())
    }

    /// Append a topic to a paired or extended chain.
    pub fn push(&mut self, next: impl Into<String>) -> Result<(), ChainError> {
        if self.topics.len() < 2 {
            return Err(ChainError::InvalidState {
                operation: "extend".to_string(),
                state: self.state().to_string(),
            });
        }
        let next = next.into();
        validate_topic(&next)?;
        if self.contains(&next) {
            warn!(topic = %next, "topic already present in chain");
        }
        self.topics.push(next);
        Ok(())
    }

    /// Clear the chain, returning the abandoned topics.
    pub fn clear(&mut self) -> Vec<String> {
        std::mem::take(&mut self.topics)
    }

    /// Render the chain as a display path: topics joined with " → ".
    pub fn display_path(&self) -> String {
        self.topics.join(PATH_SEPARATOR)
    }
}

fn validate_topic(topic: &str) -> Result<(), ChainError> {
    if topic.trim().is_empty() {
        return Err(ChainError::EmptyTopic);
    }
    Ok(())
}

/// Join an arbitrary topic list into a display path.
pub fn display_path(topics: &[String]) -> String {
    topics.join(PATH_SEPARATOR)
}
