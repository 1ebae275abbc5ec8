use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use fitplan::config::{LlmConfig, ServerConfig};
use fitplan::{backend_from_config, constants, web_server};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the planner web server.
    Start(StartArgs),
}

#[derive(clap::Args, Debug)]
struct StartArgs {
    #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
    port: u16,
    #[arg(long, default_value = "127.0.0.1", help = "Address to bind.")]
    host: IpAddr,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, help = "Gemini API key.")]
    api_key: Option<String>,
    #[arg(long, default_value_t = constants::GEMINI_MODEL.clone(), help = "Gemini model id.")]
    model: String,
    #[arg(long, default_value_t = constants::GEMINI_API_BASE.clone(), help = "Gemini API base URL.")]
    api_base: String,
    #[arg(long, default_value_t = constants::DEFAULT_REQUEST_TIMEOUT_SECS, help = "Timeout for each model request, in seconds.")]
    request_timeout_secs: u64,
    #[arg(long, default_value_t = constants::DEFAULT_SESSION_TTL_SECS, help = "Drop sessions idle for longer than this, in seconds.")]
    session_ttl_secs: u64,
    #[arg(long, default_value = constants::TEMPLATES_DIR.as_str(), help = "Directory holding the page templates.")]
    templates_dir: PathBuf,
    #[arg(long, default_value = constants::STATIC_DIR.as_str(), help = "Directory served under /static.")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (GEMINI_API_KEY usually lives there)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g. RUST_LOG=info,fitplan=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start(args) => {
            let llm_config = LlmConfig::new(
                args.api_key,
                args.model,
                args.api_base,
                Duration::from_secs(args.request_timeout_secs),
            );
            // A missing key still starts the server so the page can say so.
            let backend = backend_from_config(llm_config);

            let server_config = ServerConfig {
                addr: SocketAddr::new(args.host, args.port),
                templates_dir: args.templates_dir,
                static_dir: args.static_dir,
                session_ttl: Duration::from_secs(args.session_ttl_secs),
            };

            info!("Starting planner on {}...", server_config.addr);
            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(server_config, backend).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, shutting down...");
                    web_server_handle.abort();
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
            info!("Shutdown complete.");
        }
    }

    Ok(())
}
