mod personas_cmd;
mod status_cmd;
mod terminal_output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use promptproxy_config::{defaults, ensure_valid, env, load_from_env, ProxyConfig};
use promptproxy_gateway::start_server;
use promptproxy_logging::init_logger;

#[derive(Parser)]
#[command(name = "promptproxy")]
#[command(about = "Prompt Proxy: persona-framed chat completions behind a rate-limited gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to bind the HTTP server to (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query a running gateway's health endpoint
    Status {
        /// Gateway base URL
        #[arg(long)]
        url: Option<String>,
    },
    /// List the built-in personas
    Personas {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = load_from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config).await?;
        }
        Commands::Status { url } => {
            let url = url.unwrap_or_else(default_base_url);
            status_cmd::run(&url).await?;
        }
        Commands::Personas { json } => personas_cmd::run(json)?,
    }

    Ok(())
}

fn default_base_url() -> String {
    let port = std::env::var(env::PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(defaults::PORT);
    format!("http://localhost:{port}")
}

async fn run_server(config: ProxyConfig) -> Result<()> {
    let _guard = init_logger(&config.log_dir, &config.log_level)
        .with_context(|| format!("Cannot write logs to {}", config.log_dir))?;
    ensure_valid(&config)?;

    info!(config = %config.redacted(), "Starting Prompt Proxy");

    if let Err(e) = start_server(&config).await {
        error!(error = %e, "Gateway stopped with an error");
        return Err(e);
    }
    info!("Gateway stopped");
    Ok(())
}
