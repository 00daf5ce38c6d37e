//! `ingest-seed-git` flow: mine verified pairs from a git diff

use crate::cache::TranslationCache;
use crate::config::Config;
use crate::error::Result;
use crate::rag::{EmbeddingClient, VectorStore};
use crate::seed::{GitIngestor, GraphSeeder, SeedStore, VectorSeeder};
use crate::textutil;
use clap::ValueEnum;
use neo4rs::Graph;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Seed corpus export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Tsv,
    Json,
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_ingest_seed_git(
    config: &Config,
    pg: PgPool,
    graph: Graph,
    token: &CancellationToken,
    commit_base: &str,
    commit_target: &str,
    folder: &str,
    export_format: ExportFormat,
    export_path: &str,
) -> Result<()> {
    let repo_root = std::env::current_dir()?;

    info!(
        base = commit_base,
        target = commit_target,
        folder,
        "Starting seed ingestion from Git"
    );

    let entries = GitIngestor::new()
        .ingest_from_git(token, &repo_root, commit_base, commit_target, folder)
        .await?;

    if entries.is_empty() {
        warn!("No translation pairs found in Git diff");
        return Ok(());
    }

    info!(pairs = entries.len(), "Extracted translation pairs");

    let seed_store = SeedStore::new(pg.clone());
    let vector_store = Arc::new(VectorStore::new(pg.clone()));
    let graph_seeder = GraphSeeder::new(graph);
    graph_seeder.ensure_schema().await?;

    // Deduplicated by hash; repeat runs leave the same corpus behind.
    let stored = seed_store.upsert(&entries).await?;
    info!(stored, "Seed entries stored");

    let embedding_client = Arc::new(EmbeddingClient::new(
        &config.embedding_api_key,
        &config.embedding_model,
        &config.embedding_base_url,
        config.embedding_dimensions,
    ));
    VectorSeeder::new(embedding_client, vector_store)
        .ingest_embeddings(&entries, config.batch_size)
        .await?;

    graph_seeder.upsert_seed_nodes(&entries).await?;

    // Seed sources become cache hits for every later translate run.
    let cache = TranslationCache::new(pg);
    for e in &entries {
        if let Err(err) = cache.set(&e.source_text, &e.translated_text).await {
            warn!(
                error = %err,
                text = %textutil::truncate(&e.source_text, 30),
                "Failed to cache seed translation"
            );
        }
    }

    let output = match export_format {
        ExportFormat::Json => {
            let path = PathBuf::from(format!("{}.json", export_path));
            seed_store.export_json(&path).await?;
            path
        }
        ExportFormat::Tsv => {
            let path = PathBuf::from(format!("{}.tsv", export_path));
            seed_store.export_tsv(&path).await?;
            path
        }
    };

    info!(
        pairs = entries.len(),
        stored,
        corpus = %output.display(),
        "Seed ingestion complete"
    );

    Ok(())
}
