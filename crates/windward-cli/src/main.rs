use std::sync::Arc;

use clap::{Parser, Subcommand};

use windward_chat::ChatService;
use windward_core::config::Config;
use windward_providers::AssistantProvider;
use windward_providers::openai::OpenAiAssistants;
use windward_server::{AppState, start_server};
use windward_tools::{ToolRegistry, register_builtin_tools};

#[derive(Parser)]
#[command(
    name = "windward",
    about = "Assistant chat relay with streaming tool dispatch",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (secrets masked)
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let config = Arc::new(Config::from_env());

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or_else(|| config.listen_port());

            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
            let provider: Arc<dyn AssistantProvider> =
                Arc::new(OpenAiAssistants::new(api_key, None));

            let mut tools = ToolRegistry::new();
            register_builtin_tools(&mut tools);

            let chat = Arc::new(ChatService::new(provider, Arc::new(tools), config.clone()));
            let state = Arc::new(AppState::new(config, chat));

            tracing::info!(port, "Starting Windward");
            start_server(state, port).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config.redacted())?;
                println!("{json}");
            }
        },
    }

    Ok(())
}
