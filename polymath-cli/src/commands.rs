//! CLI subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use polymath_core::api;
use polymath_core::session::{run_mind_map, run_related_topics, run_research};
use polymath_core::{AppConfig, ModelGateway, OpenAiGateway, TopicChain};

use crate::render;
use crate::{Commands, ConfigAction};

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => handle_serve(host, port, config).await,
        Commands::Research {
            primary,
            intent,
            previous,
            output,
        } => handle_research(primary, intent, previous, output.as_deref(), &config).await,
        Commands::Continue {
            topics,
            next,
            output,
        } => handle_continue(topics, next, output.as_deref(), &config).await,
        Commands::Related { topics } => handle_related(topics, &config).await,
        Commands::MindMap {
            primary,
            secondary,
            output,
        } => handle_mind_map(primary, secondary, output.as_deref(), &config).await,
        Commands::Config { action } => handle_config(action, &config),
    }
}

fn make_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn ModelGateway>> {
    Ok(Arc::new(OpenAiGateway::new(config.llm.clone())?))
}

async fn handle_serve(
    host: Option<String>,
    port: Option<u16>,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::info!(model = %config.llm.model, "starting research API server");
    let gateway = make_gateway(&config)?;
    api::serve(&config.server, gateway).await?;
    Ok(())
}

async fn handle_research(
    primary: String,
    intent: String,
    previous: Vec<String>,
    output: Option<&Path>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut topics = vec![primary, intent];
    topics.extend(previous);
    let chain = TopicChain::from_topics(topics)?;

    let gateway = make_gateway(config)?;
    let result = run_research(gateway.as_ref(), chain.topics()).await?;

    render::print_research(&result, &chain.display_path());
    if let Some(path) = output {
        write_json(path, &result)?;
    }
    Ok(())
}

async fn handle_continue(
    topics: Vec<String>,
    next: String,
    output: Option<&Path>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut chain = TopicChain::from_topics(topics)?;
    chain.push(next)?;

    let gateway = make_gateway(config)?;
    let result = run_research(gateway.as_ref(), chain.topics()).await?;

    render::print_research(&result, &chain.display_path());
    if let Some(path) = output {
        write_json(path, &result)?;
    }
    Ok(())
}

async fn handle_related(topics: Vec<String>, config: &AppConfig) -> anyhow::Result<()> {
    let chain = TopicChain::from_topics(topics)?;
    let gateway = make_gateway(config)?;
    let related = run_related_topics(gateway.as_ref(), chain.topics()).await?;
    render::print_related(&related);
    Ok(())
}

async fn handle_mind_map(
    primary: String,
    secondary: Vec<String>,
    output: Option<&Path>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut topics = vec![primary];
    topics.extend(secondary);
    let chain = TopicChain::from_topics(topics)?;

    let gateway = make_gateway(config)?;
    let map = run_mind_map(gateway.as_ref(), chain.topics()).await?;

    render::print_mind_map(&map);
    if let Some(path) = output {
        write_json(path, &map)?;
    }
    Ok(())
}

fn handle_config(action: ConfigAction, config: &AppConfig) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let path = Path::new("polymath.toml");
            if path.exists() {
                println!("Configuration file already exists at: {}", path.display());
                return Ok(());
            }
            let toml_str = toml::to_string_pretty(&AppConfig::default())?;
            std::fs::write(path, &toml_str)?;
            println!("Created default configuration at: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    println!("Saved result to: {}", path.display());
    Ok(())
}
