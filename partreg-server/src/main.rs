//! # Partition Registry Server
//!
//! Readiness coordination for interval-partitioned data sources.
//!
//! Producers register sources, providers, and partitions, then report
//! progress through LOCK/UNLOCK events; consumers ask whether an interval
//! of a source is ready to be read. PostgreSQL holds the durable state.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use partreg_core::{GapScan, IntervalCut, PostgresStore, ReadinessStrategy, RegistryService};
use partreg_server::{
    AppState, Config, config::ReadinessStrategyKind, routes::build_router,
};

#[derive(Parser, Debug)]
#[command(name = "partreg-server")]
#[command(about = "Partition readiness registry over PostgreSQL")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Server port (overrides config)
    #[arg(short, long, env = "PARTREG_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "PARTREG_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env; absence is normal in production.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if config.database.url.is_empty() {
        anyhow::bail!(
            "no database URL configured; set PARTREG_DATABASE_URL or database.url in the config file"
        );
    }

    let store = PostgresStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;

    if let Some(Command::Migrate) = cli.command {
        store.migrate().await.context("database migration failed")?;
        info!("database migrations applied");
        return Ok(());
    }

    store.migrate().await.context("database migration failed")?;

    let strategy: Box<dyn ReadinessStrategy> = match config.readiness.strategy {
        ReadinessStrategyKind::GapScan => Box::new(GapScan),
        ReadinessStrategyKind::IntervalCut => Box::new(IntervalCut),
    };
    let registry = RegistryService::with_strategy(store.stores(), strategy);
    let state = AppState::new(registry);
    let app = build_router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "partition registry listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
