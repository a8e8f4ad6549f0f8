use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder_watch::api::{self, state::AppState};
use ladder_watch::config::AppConfig;
use ladder_watch::fetch::{ClientConfig, LadderClient};
use ladder_watch::pipeline::Aggregator;
use ladder_watch::scheduler::RefreshScheduler;
use ladder_watch::storage::{SnapshotStore, StorageConfig};
use ladder_watch::view::{derive_view, render_table, SortDirection, SortKey, ViewRow};

#[derive(Parser)]
#[command(name = "ladder-watch")]
#[command(about = "Solo-queue ranked stats tracker for a fixed roster")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the refresh scheduler and the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number (falls back to $PORT, then the config file)
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Run one aggregation cycle and write the snapshot
    Refresh,

    /// Print the stored snapshot as a table
    View {
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        filter: String,

        /// Column to sort by (summonerName, tier, rank, leaguePoints, wins, losses, winRate)
        #[arg(long, default_value = "summonerName")]
        sort: SortKey,

        /// Sort direction (asc, desc)
        #[arg(long, default_value = "asc")]
        order: SortDirection,
    },
}

/// Load the config file, or defaults when it does not exist.
fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        let config = AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}

fn init_tracing(log_level: &str, json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_scheduler(config: &AppConfig, store: Arc<SnapshotStore>) -> Result<Arc<RefreshScheduler>> {
    let api_key = config.resolve_api_key()?;
    let client = LadderClient::new(ClientConfig::from_api_config(&config.api, api_key)?)?;
    let aggregator = Aggregator::new(Arc::new(client), config.roster.clone());
    Ok(Arc::new(RefreshScheduler::new(
        aggregator,
        store,
        config.refresh_period()?,
    )))
}

/// `--port`, then `$PORT`, then the config file.
fn resolve_port(cli_port: Option<u16>, configured: u16) -> Result<u16> {
    if let Some(port) = cli_port {
        return Ok(port);
    }
    match std::env::var("PORT") {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid PORT environment variable: {}", value)),
        Err(_) => Ok(configured),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_found) = load_config(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_tracing(&log_level, cli.json_logs);

    tracing::info!("Starting ladder-watch v{}", env!("CARGO_PKG_VERSION"));
    if !config_found {
        tracing::warn!(
            "Config file {} not found, using defaults",
            cli.config.display()
        );
    }
    config.validate()?;

    let storage = StorageConfig::new(config.data_dir.clone());
    let store = Arc::new(SnapshotStore::for_config(&storage));

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            let scheduler = build_scheduler(&config, store)?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = resolve_port(port, config.server.port)?;

            let refresh_loop = scheduler.clone().start();

            let state = AppState::new(scheduler.clone());
            let mut app =
                api::build_router(state).layer(api::cors_layer(&config.server.cors_origin));
            if access_log {
                app = app.layer(TraceLayer::new_for_http());
            }

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Serving ladder stats on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            scheduler.shutdown();
            refresh_loop.abort();
            tracing::info!("Server shut down gracefully");
        }
        Commands::Refresh => {
            let scheduler = build_scheduler(&config, store.clone())?;
            let report = scheduler.run_once().await?;

            println!("Refresh complete");
            println!("  Snapshot:  {}", store.path().display());
            println!("  Players:   {}", report.players);
            println!("  Ranked:    {}", report.ranked);
            println!("  Unranked:  {}", report.unranked);
            println!("  Failed:    {}", report.failed);
            println!("  Duration:  {}ms", report.duration_ms);
            for failure in &report.failures {
                println!("    - {}", failure);
            }
        }
        Commands::View {
            filter,
            sort,
            order,
        } => {
            let snapshot = store.load().await?;
            let rows: Vec<ViewRow> = derive_view(&snapshot, &filter, sort, order)
                .iter()
                .map(ViewRow::from)
                .collect();
            print!("{}", render_table(&rows));
        }
    }

    Ok(())
}
