use std::path::PathBuf;

use clap::Parser;
use robosim::api;
use robosim::{Settings, TradingEngine};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "robosim=info,tower_http=info";

/// Local trading-robot backend against a simulated broker
#[derive(Debug, Parser)]
#[command(name = "robosim", version, about)]
struct Cli {
    /// Settings file (TOML); missing file means defaults
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter, e.g. "robosim=debug" (defaults to RUST_LOG)
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging(cli.log_filter.as_deref());

    tracing::info!("🚀 robosim starting");

    let mut settings = Settings::load(&cli.config)?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    let addr = settings.socket_addr()?;
    let engine = TradingEngine::from_settings(&settings)?;

    tracing::info!("📊 Configuration:");
    tracing::info!("  Seed: {}", settings.market.seed);
    tracing::info!(
        "  Moving averages: {}/{} over {} candles",
        settings.market.fast_period,
        settings.market.slow_period,
        settings.market.candle_limit
    );
    tracing::info!(
        "  Supported accounts: {}",
        settings.session.supported_domains.join(", ")
    );

    api::run_server(addr, engine).await?;

    tracing::info!("👋 robosim stopped");
    Ok(())
}

fn setup_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
