//! Prompt construction for the three request kinds.
//!
//! Each kind pairs a fixed system prompt (instructions plus the literal JSON
//! schema the model must emit) with a user prompt generated from the topic
//! list. Building a prompt is a pure function of its inputs; the topic slice
//! is never mutated or reordered.

use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// System prompt for research outputs. The embedded JSON schema is the wire
/// contract the extractor and `ResearchResult` rely on; change them together.
const RESEARCH_SYSTEM_PROMPT: &str = r#"You are a multidisciplinary research assistant specializing in connecting diverse academic topics.
Your task is to create a comprehensive research output that connects the provided topics
through various academic lenses such as sociology, economics, history, anthropology, environmental studies, cultural studies, and political science.

IMPORTANT: Follow this exact structure for your analysis:
1. Start with connecting the primary topic and intent topic
2. Then connect those to the third topic (if provided)
3. Maintain all previous connections when adding new topics

For example, if analyzing multiple topics:
- First analyze the connections between the first two topics in detail
- Then show how additional topics connect to the previous ones
- Always maintain the previous connections while adding new topics
- Create rich, nuanced connections between all topics with specific subtopics
- Identify cross-cutting themes that span all topics

Your analysis should include:
- Specific subtopics under each disciplinary lens
- Detailed explanations of how topics intersect
- Historical contexts and contemporary relevance
- Power dynamics and structural relationships
- Practical implications and applications

Format your response as a JSON object with the following structure:
{
    "research_output": {
        "title": "Connecting [Topics]: A Multidisciplinary Exploration",
        "introduction": "Brief introduction to the connection between the topics",
        "connections": [
            {
                "discipline": "[Relevant Discipline]",
                "explanation": "Detailed explanation of connections through this discipline",
                "subtopics": [
                    {
                        "name": "[Specific Subtopic]",
                        "details": "Detailed explanation of this subtopic"
                    }
                ],
                "themes": ["Theme 1", "Theme 2", "Theme 3"]
            }
        ],
        "research_questions": [
            "Research question 1",
            "Research question 2",
            "Research question 3"
        ],
        "cross_cutting_themes": [
            "Theme connecting all topics 1",
            "Theme connecting all topics 2",
            "Theme connecting all topics 3"
        ],
        "mind_map": {
            "central_themes": "[List of all connected topics]",
            "key_connections": [
                {
                    "node": "[Connection Point]",
                    "connects_to": "[Related Topic]",
                    "research_angles": "[Specific research approaches]"
                }
            ]
        }
    },
    "related_topics": [
        {
            "topic": "Related Topic 1",
            "relevance": "Explanation of how this topic connects to the current research"
        },
        {
            "topic": "Related Topic 2",
            "relevance": "Explanation of how this topic connects to the current research"
        },
        {
            "topic": "Related Topic 3",
            "relevance": "Explanation of how this topic connects to the current research"
        }
    ]
}

The research output should be comprehensive, academic in tone, and highlight meaningful connections
between the topics across multiple disciplines. The related topics should be relevant areas that would
expand the research in interesting directions."#;

/// System prompt for node/edge mind maps.
const MIND_MAP_SYSTEM_PROMPT: &str = r#"You are a multidisciplinary research assistant specialized in creating comprehensive mind maps.
Your task is to analyze the provided topics and generate a detailed mind map showing connections
across various academic disciplines including sociology, economics, history, anthropology, and political science.

For each connection, provide:
1. A brief explanation of how the topics relate
2. The academic discipline(s) relevant to this connection
3. Key themes or concepts that bridge these topics

Format your response as a JSON object with the following structure:
{
    "nodes": [
        {"id": "unique_id", "label": "Node Label", "group": "discipline", "description": "detailed description"}
    ],
    "edges": [
        {"from": "source_node_id", "to": "target_node_id", "label": "relationship", "description": "explanation"}
    ],
    "related_topics": [
        {"topic": "Related Topic 1", "relevance": "Brief explanation of relevance"},
        {"topic": "Related Topic 2", "relevance": "Brief explanation of relevance"},
        {"topic": "Related Topic 3", "relevance": "Brief explanation of relevance"}
    ]
}

The 'related_topics' should contain 3 topics that are not already in the mind map but are highly relevant to the existing topics.
These should be topics that would be interesting to explore next and would add valuable connections to the mind map.

Be comprehensive but concise. Focus on academic connections and ensure all relationships are substantiated."#;

/// System prompt for related-topic suggestions.
const RELATED_TOPICS_SYSTEM_PROMPT: &str = r#"You are a multidisciplinary research assistant specializing in connecting diverse academic topics.
Your task is to suggest related topics that would expand the research on the provided topics.

For each suggested topic, provide:
1. The topic name
2. A brief explanation of how it connects to the provided topics
3. Why exploring this connection would be valuable

Format your response as a JSON object with the following structure:
{
    "related_topics": [
        {
            "topic": "Related Topic 1",
            "relevance": "Explanation of how this topic connects to the current research"
        },
        {
            "topic": "Related Topic 2",
            "relevance": "Explanation of how this topic connects to the current research"
        },
        {
            "topic": "Related Topic 3",
            "relevance": "Explanation of how this topic connects to the current research"
        }
    ]
}"#;

/// The kind of round trip a prompt drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Research,
    MindMap,
    RelatedTopics,
}

impl PromptKind {
    /// Minimum number of topics this kind requires.
    pub fn min_topics(self) -> usize {
        match self {
            PromptKind::Research | PromptKind::MindMap => 2,
            PromptKind::RelatedTopics => 1,
        }
    }

    /// Sampling parameters for this kind, matching the tuned values per
    /// request shape (suggestions run hotter and shorter).
    pub fn sampling(self) -> Sampling {
        match self {
            PromptKind::Research => Sampling {
                temperature: 0.7,
                max_tokens: Some(4000),
            },
            PromptKind::MindMap => Sampling {
                temperature: 0.7,
                max_tokens: None,
            },
            PromptKind::RelatedTopics => Sampling {
                temperature: 0.8,
                max_tokens: Some(1000),
            },
        }
    }
}

/// Fixed sampling parameters for one prompt kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

/// A system/user prompt pair ready for one gateway round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt pair for `kind` over an ordered topic list.
///
/// For research and mind maps the first two topics are the anchor pair; all
/// remaining topics are supplied as an undifferentiated previous-topics set,
/// which tells the model to preserve previously established connections.
pub fn build_prompt(kind: PromptKind, topics: &[String]) -> Result<Prompt, ChainError> {
    let needed = kind.min_topics();
    if topics.len() < needed {
        return Err(ChainError::NotEnoughTopics {
            needed,
            got: topics.len(),
        });
    }

    let user = match kind {
        PromptKind::Research => research_user_prompt(topics),
        PromptKind::MindMap => mind_map_user_prompt(topics),
        PromptKind::RelatedTopics => related_topics_user_prompt(topics),
    };

    let system = match kind {
        PromptKind::Research => RESEARCH_SYSTEM_PROMPT,
        PromptKind::MindMap => MIND_MAP_SYSTEM_PROMPT,
        PromptKind::RelatedTopics => RELATED_TOPICS_SYSTEM_PROMPT,
    };

    Ok(Prompt {
        system: system.to_string(),
        user,
    })
}

fn research_user_prompt(topics: &[String]) -> String {
    let (primary, intent) = (&topics[0], &topics[1]);
    if topics.len() == 2 {
        format!(
            "Create a multidisciplinary research output connecting {primary} and {intent}. \
             Focus on meaningful connections between these topics across different academic disciplines."
        )
    } else {
        let previous = topics[2..].join(", ");
        format!(
            "Create a multidisciplinary research output connecting {primary}, {intent}, \
             and the following previous topics: {previous}. \
             Pay special attention to the interconnections between all topics."
        )
    }
}

fn mind_map_user_prompt(topics: &[String]) -> String {
    let primary = &topics[0];
    let connected = topics[1..].join(", ");
    format!(
        "Create a multidisciplinary research mind map for the primary topic '{primary}' \
         and how it connects with {connected}. Include connections across sociology, \
         economics, history, anthropology, and political science."
    )
}

fn related_topics_user_prompt(topics: &[String]) -> String {
    let joined = join_with_and(topics);
    format!(
        "Suggest related topics that would expand research on {joined}. \
         Focus on topics that create interesting interdisciplinary connections."
    )
}

/// Oxford-style join: "A", "A, and B", "A, B, and C".
fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}
