use bedrock::check;
use bedrock::config::Config;
use bedrock::error::AppResult;
use bedrock::server;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::EnvFilter;

/// bedrock - A minimal backend service bootstrap
#[derive(Parser, Debug)]
#[command(name = "bedrock")]
#[command(version = "1.0.0")]
#[command(about = "A minimal backend service bootstrap", long_about = None)]
struct Cli {
    /// Directory holding the .env file and ca.pem trust anchor
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server
    Server {
        /// Host to bind to (overrides SERVER_HOST env var)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT env var)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Verify database connectivity and exit
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        )
        .init();

    if let Err(err) = run(cli).await {
        error!("startup failed: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let config = Config::load(&cli.base_dir)?;

    match cli.command {
        Commands::Server { host, port } => {
            // Override config with CLI args if provided
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);

            server::run_server(config, addr).await
        }
        Commands::Check => check::run(config).await,
    }
}
