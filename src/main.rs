//! Granary Server Entry Point

use clap::{Parser, Subcommand};
use granary::{create_rest_router, Config, GrantService, RestApiConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// Granary: Grant Tagging and Filtering Service
#[derive(Parser, Debug)]
#[command(name = "granary")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a grant without storing it
    Classify {
        /// Grant name
        name: String,
        /// Grant description
        description: String,
    },
    /// List the canonical tags and their synonyms
    Tags,
    /// Show the effective tag set for a comma-separated selection
    Expand {
        /// Comma-separated tag selection (e.g., "water,education")
        tags: String,
        /// Skip synonym expansion, canonicalize only
        #[arg(long)]
        no_synonyms: bool,
    },
    /// Run the HTTP server (default behavior)
    Serve {
        /// HTTP port. If not specified, uses config file value.
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // For CLI commands (non-serve), use minimal logging
    let is_serve = matches!(args.command, Some(Command::Serve { .. }) | None);

    if !is_serve {
        // Minimal logging for CLI commands
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        Some(Command::Classify { name, description }) => {
            let config = load_config(&args.config)?;
            cli::run_classify(config, name, description, args.json).await
        }
        Some(Command::Tags) => {
            let config = load_config(&args.config)?;
            cli::run_tags(config, args.json)
        }
        Some(Command::Expand { tags, no_synonyms }) => {
            let config = load_config(&args.config)?;
            cli::run_expand(config, tags, no_synonyms, args.json)
        }
        Some(Command::Serve { port, json_logs }) => {
            run_http_server(&args.config, port, json_logs).await
        }
        None => {
            // Default: run the HTTP server using config file settings
            run_http_server(&args.config, None, false).await
        }
    }
}

fn load_config(config_path: &Option<String>) -> anyhow::Result<Config> {
    let config = if let Some(path) = config_path {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    Ok(config)
}

/// Run the HTTP server.
async fn run_http_server(
    config_path: &Option<String>,
    port: Option<u16>,
    json_logs: bool,
) -> anyhow::Result<()> {
    // Initialize tracing for server mode
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Granary v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = load_config(config_path)?;

    // Override port from CLI args only if explicitly provided
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!(
        bind = %config.server.bind,
        port = config.server.port,
        storage_backend = ?config.storage.backend,
        remote_model = config.model.enabled(),
        "Configuration loaded"
    );

    let service = Arc::new(GrantService::new(&config)?);

    let rest_config = RestApiConfig {
        enable_cors: config.server.enable_cors,
        ..RestApiConfig::default()
    };
    let app = create_rest_router(service, &rest_config);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    tracing::info!("Granary listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    tracing::info!("Granary shutting down");
    Ok(())
}
