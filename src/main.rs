use anyhow::Result;
use clap::Parser;
use solr_exporter::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Unix socket to listen on for telemetry (overrides config)
    #[arg(long = "unix-sock")]
    unix_sock: Option<String>,

    /// Path under which to expose metrics (overrides config)
    #[arg(long = "web.telemetry-path")]
    telemetry_path: Option<String>,

    /// Solr base URL, e.g. http://localhost:8080/solr (overrides config)
    #[arg(long = "solr-url")]
    solr_url: Option<String>,

    /// Unix socket of the detail metrics feed (overrides config)
    #[arg(long = "solr-detail")]
    solr_detail: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Solr Prometheus Exporter v{}", env!("CARGO_PKG_VERSION"));

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(sock) = args.unix_sock {
        config.server.listen_socket = sock;
    }
    if let Some(path) = args.telemetry_path {
        config.server.metrics_path = path;
    }
    if let Some(url) = args.solr_url {
        config.solr.base_url = url;
    }
    if let Some(detail) = args.solr_detail {
        config.passthrough.socket_path = detail;
    }

    info!("Configuration loaded successfully");
    info!("Solr URL: {}", config.solr.base_url);
    info!("Passthrough socket: {}", config.passthrough.socket_path);
    info!(
        "Metrics endpoint: unix:{}{}",
        config.server.listen_socket, config.server.metrics_path
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
