use clap::Parser;
use loyalteez_mcp::clients::{Network, ServiceConfig};
use loyalteez_mcp::transport::serve_stdio;
use loyalteez_mcp::McpServer;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "loyalteez-mcp",
    version,
    about = "MCP server for the Loyalteez loyalty platform over stdio"
)]
struct Cli {
    /// Network to target (mainnet or testnet). Overrides LOYALTEEZ_NETWORK.
    #[arg(long)]
    network: Option<Network>,

    /// Default brand wallet address. Overrides LOYALTEEZ_BRAND_ID.
    #[arg(long)]
    brand_id: Option<String>,

    /// Markdown documentation root. Overrides LOYALTEEZ_DOCS_PATH.
    #[arg(long)]
    docs_path: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,loyalteez_mcp=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let mut config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("loyalteez-mcp: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(network) = cli.network {
        config = config.with_network(network);
    }
    if let Some(brand_id) = cli.brand_id {
        config.default_brand_id = Some(brand_id);
    }
    if let Some(docs_path) = cli.docs_path {
        config.docs_path = Some(docs_path);
    }

    let server = match McpServer::from_config(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to build API clients: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "loyalteez-mcp {} on {} ({} tools)",
        env!("CARGO_PKG_VERSION"),
        config.network,
        server.list_tools().await.len()
    );

    match serve_stdio(&server).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Transport failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
