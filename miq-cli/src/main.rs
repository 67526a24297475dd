//! Command-line entry point: loads configuration, wires the agent registry
//! into the orchestrator, registers the demo connectors, and serves the
//! chat-platform gateway alongside the orchestrator's background loops.

mod commands;

use clap::Parser;
use miq_connectors::{ConnectorRegistry, DemoChannelConnector, DemoMamConnector};
use miq_core::config::Settings;
use miq_gateway::{AppState, ConversationManager, Router};
use miq_gateway::router::{NullLlmClient, OpenAiRouterClient};
use miq_orchestrator::{scheduler::default_schedules, Orchestrator};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// MediaAgentIQ: autonomous multi-agent orchestration for broadcast operations.
#[derive(Parser, Debug)]
#[command(name = "miq", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the orchestrator and the chat-platform gateway
    Serve,
    /// Print the resolved configuration and exit
    Config,
    /// List the registered agents and their required integrations
    Agents,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter)).with_target(false).init();

    let settings = Settings::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Config => commands::show_config(&settings),
        Commands::Agents => commands::list_agents(&settings),
        Commands::Serve => serve(settings).await,
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let settings = Arc::new(settings);

    let connectors = Arc::new(ConnectorRegistry::new());
    connectors.register(Arc::new(DemoChannelConnector::new("demo-channel"))).await;
    connectors.register(Arc::new(DemoMamConnector::new("demo-mam"))).await;
    let _ = connectors.connect_all().await;

    let agents = miq_agents::build_agent_runtimes(Arc::clone(&settings));

    let mut orchestrator = Orchestrator::new(agents, Arc::clone(&settings));
    for job in default_schedules() {
        orchestrator.scheduler().lock().await.schedule(job);
    }
    orchestrator.run();

    let llm_client: Arc<dyn miq_gateway::router::RouterLlmClient> = if settings.is_openai_configured() {
        Arc::new(OpenAiRouterClient::new(
            settings.openai_api_key.clone().unwrap_or_default(),
            settings.openai_model.clone(),
        ))
    } else {
        Arc::new(NullLlmClient)
    };
    let tools = connectors.get_all_tool_definitions().await;
    let router = Arc::new(Router::new(llm_client, tools));

    let conversations = Arc::new(ConversationManager::new(20, 30));

    let state = AppState {
        router,
        conversations,
        orchestrator: orchestrator.handle(),
        settings: Arc::clone(&settings),
    };
    let app = miq_gateway::build_router(state);

    let bind_addr = settings.bind_addr();
    tracing::info!(%bind_addr, "starting gateway");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    orchestrator.stop();
    Ok(())
}
