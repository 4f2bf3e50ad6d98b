//! # Impact Directory Main Entry Point
//!
//! `directory serve` (the default) migrates and serves the API,
//! `directory migrate` only applies migrations and `directory seed`
//! loads the reference data.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use directory::{config::ConfigLoader, db, seeds, server::run_server, telemetry};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "directory", version, about = "Social-impact organization directory service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations, then serve the HTTP API
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Apply pending migrations and seed reference data
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let pool = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&pool).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let shutdown = CancellationToken::new();
            tokio::spawn(wait_for_signal(shutdown.clone()));
            run_server(Arc::new(config), pool, shutdown).await?;
        }
        Command::Migrate => {}
        Command::Seed => {
            let report = seeds::seed_reference_data(&pool)
                .await
                .context("seeding reference data")?;
            tracing::info!(
                created = report.created,
                skipped = report.skipped,
                "Reference data seeded"
            );
        }
    }

    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
