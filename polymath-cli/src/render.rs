//! Terminal rendering of structured research results.

use polymath_core::{MindMap, RelatedTopic, ResearchResult};

/// Print a research result in readable form.
pub fn print_research(result: &ResearchResult, connection_path: &str) {
    let output = &result.research_output;

    println!("\n=== {} ===\n", output.title);
    println!("{}\n", output.introduction);

    for connection in &output.connections {
        println!("--- {} ---", connection.discipline);
        println!("{}", connection.explanation);
        for subtopic in &connection.subtopics {
            println!("  * {}: {}", subtopic.name, subtopic.details);
        }
        if !connection.themes.is_empty() {
            println!("  Themes: {}", connection.themes.join(", "));
        }
        println!();
    }

    if !output.research_questions.is_empty() {
        println!("Research questions:");
        for (i, question) in output.research_questions.iter().enumerate() {
            println!("  {}. {}", i + 1, question);
        }
        println!();
    }

    if !output.cross_cutting_themes.is_empty() {
        println!(
            "Cross-cutting themes: {}\n",
            output.cross_cutting_themes.join(", ")
        );
    }

    print_related(&result.related_topics);
    println!("Connection path: {connection_path}");
}

/// Print suggested related topics.
pub fn print_related(related: &[RelatedTopic]) {
    if related.is_empty() {
        return;
    }
    println!("Related topics:");
    for entry in related {
        println!("  - {}: {}", entry.topic, entry.relevance);
    }
    println!();
}

/// Print a mind map as an indented node/edge listing.
pub fn print_mind_map(map: &MindMap) {
    println!("\nNodes:");
    for node in &map.nodes {
        if node.description.is_empty() {
            println!("  [{}] {} ({})", node.id, node.label, node.group);
        } else {
            println!(
                "  [{}] {} ({}) — {}",
                node.id, node.label, node.group, node.description
            );
        }
    }

    println!("\nEdges:");
    for edge in &map.edges {
        println!("  {} -[{}]-> {}", edge.from, edge.label, edge.to);
    }
    println!();

    print_related(&map.related_topics);
}
