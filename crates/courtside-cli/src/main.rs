use std::process::ExitCode;

use clap::Parser;
use courtside_core::{AppConfig, SyncConfig, SyncMode, SyncStats};
use courtside_db::{connect_pool_lazy, PgLocationStore, PoolConfig};
use courtside_index::AlgoliaClient;
use courtside_sync::SyncOrchestrator;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "courtside-sync")]
#[command(about = "Mirror court locations into the search index")]
struct Cli {
    /// Clear the index and resync every location
    #[arg(short, long, conflicts_with = "incremental")]
    full: bool,

    /// Resync locations modified in the last 24 hours (the default)
    #[arg(short, long)]
    incremental: bool,

    /// Push index settings (searchable attributes, facets, ranking)
    #[arg(short, long)]
    configure: bool,

    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Documents per upsert; without a value, uses SYNC_BATCH_SIZE
    #[arg(
        long,
        value_name = "N",
        num_args = 0..=1,
        require_equals = true,
        value_parser = parse_batch_size
    )]
    batch_size: Option<Option<usize>>,

    /// Remove a location from the index by id (repeatable)
    #[arg(long = "delete", value_name = "ID")]
    delete: Vec<String>,
}

impl Cli {
    /// `None` when only configure or delete work was requested.
    fn sync_mode(&self) -> Option<SyncMode> {
        if self.full {
            Some(SyncMode::Full)
        } else if self.incremental || (!self.configure && self.delete.is_empty()) {
            Some(SyncMode::Incremental)
        } else {
            None
        }
    }

    fn batch_size(&self, configured: usize) -> usize {
        self.batch_size.flatten().unwrap_or(configured)
    }
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("batch size must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid batch size '{raw}': {e}")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "courtside-sync failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &AppConfig, debug: bool) -> anyhow::Result<()> {
    let env_filter = if debug {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

/// Returns `Ok(false)` when the run finished but something failed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    dotenvy::dotenv().ok();
    let config = courtside_core::load_app_config()?;
    let debug = cli.debug || config.sync_debug;
    init_tracing(&config, debug)?;

    let index = AlgoliaClient::from_app_config(&config)?;
    let pool = connect_pool_lazy(&config.database_url, PoolConfig::from_app_config(&config))?;
    let mode = cli.sync_mode();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let sync_config = SyncConfig {
        batch_size: cli.batch_size(config.sync_batch_size),
        debug,
        mode: mode.unwrap_or(SyncMode::Incremental),
    };
    let mut orchestrator = SyncOrchestrator::new(PgLocationStore::new(pool), index, sync_config)
        .with_cancellation(cancel);

    let mut all_ok = true;
    let mut stats = SyncStats::start();

    if cli.configure {
        orchestrator.configure_index().await?;
        println!("index settings updated");
    }

    for id in &cli.delete {
        if let Err(e) = orchestrator.delete_location(id, &mut stats).await {
            tracing::error!(id = %id, error = %e, "failed to delete location from index");
            all_ok = false;
        }
    }

    if mode.is_some() {
        let deletions = stats.deletions;
        stats = orchestrator.run().await?;
        stats.deletions = deletions;
    } else {
        stats.finish();
    }

    print_summary(mode, &stats);
    Ok(all_ok && stats.is_clean())
}

fn print_summary(mode: Option<SyncMode>, stats: &SyncStats) {
    let mode = mode.map_or_else(|| "none".to_string(), |m| m.to_string());
    println!("sync summary ({mode})");
    println!("  processed:  {}", stats.total_processed);
    println!("  succeeded:  {}", stats.successful_upserts);
    println!("  failed:     {}", stats.failed_upserts);
    println!("  deleted:    {}", stats.deletions);
    println!("  duration:   {:.2}s", stats.duration().as_secs_f64());
    if stats.interrupted {
        println!("  interrupted before completion");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, finishing current batch");
}
