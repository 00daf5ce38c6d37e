//! Pipeline flows
//!
//! One module per subcommand, plus the shared wiring: store connections
//! (verified at startup, fatal on failure) and the signal-driven
//! cancellation token every flow threads through its work.

mod ingest;
mod seed_ingest;
mod translate;

pub use ingest::cmd_ingest;
pub use seed_ingest::{cmd_ingest_seed_git, ExportFormat};
pub use translate::cmd_translate;

use crate::config::Config;
use crate::error::Result;
use crate::graph;
use neo4rs::Graph;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Opens and verifies both durable stores. Connectivity failures here are
/// fatal: nothing downstream can degrade gracefully without them.
pub async fn connect_stores(config: &Config) -> Result<(PgPool, Graph)> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("Connected to PostgreSQL");

    let graph = graph::connect(config).await?;
    info!("Connected to graph store");

    Ok((pool, graph))
}

/// Installs a SIGINT/SIGTERM handler that cancels the returned token once.
pub fn install_shutdown_handler() -> Result<CancellationToken> {
    let token = CancellationToken::new();

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let handle = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
        warn!("Received shutdown signal, cancelling...");
        handle.cancel();
    });

    Ok(token)
}
