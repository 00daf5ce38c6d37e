//! `ingest` flow: parse game files, build the graph, store embeddings

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::GraphBuilder;
use crate::parsers::ParseResult;
use crate::pool::Pool;
use crate::rag::{EmbeddingClient, EmbeddingRecord, VectorStore};
use crate::textutil;
use crate::walker::{FileEntry, Walker};
use neo4rs::Graph;
use sqlx::PgPool;
use std::collections::HashSet;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub async fn cmd_ingest(
    config: &Config,
    pg: PgPool,
    graph: Graph,
    token: &CancellationToken,
    input_dir: &Path,
) -> Result<()> {
    let vector_store = VectorStore::new(pg);

    let graph_builder = GraphBuilder::new(graph);
    graph_builder.ensure_schema().await?;
    graph_builder.seed_terminology().await?;

    let entries = Walker::new().walk(input_dir)?;
    info!(files = entries.len(), "Starting file ingestion");

    let parse_pool = Pool::new(
        config.worker_count,
        |_token: CancellationToken, entry: FileEntry| async move { entry.parser.parse(&entry.path) },
    );
    let parse_results = parse_pool.execute(token, entries.clone()).await;

    // Embed each unique text exactly once; context is the parser's k=v pairs.
    let mut seen: HashSet<String> = HashSet::new();
    let mut texts: Vec<String> = Vec::new();
    let mut contexts: Vec<String> = Vec::new();

    for task in &parse_results {
        let result: &ParseResult = match &task.result {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, file = %task.input.path.display(), "Parse failed");
                continue;
            }
        };

        for et in &result.texts {
            if !seen.insert(et.text.clone()) {
                continue;
            }
            texts.push(et.text.clone());

            let ctx_str = et
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            contexts.push(ctx_str.clone());

            if let Err(e) = graph_builder
                .add_entity_from_text(&et.text, &et.file, &ctx_str)
                .await
            {
                warn!(error = %e, text = %textutil::truncate(&et.text, 30), "Failed to add entity to graph");
            }
        }
    }

    info!(unique_texts = texts.len(), "Extracted unique texts");

    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let embedding_client = EmbeddingClient::new(
        &config.embedding_api_key,
        &config.embedding_model,
        &config.embedding_base_url,
        config.embedding_dimensions,
    );
    let embeddings = embedding_client
        .embed_batch(&texts, config.batch_size)
        .await?;

    let mut records = Vec::with_capacity(texts.len());
    for (i, text) in texts.iter().enumerate() {
        let Some(vector) = embeddings.get(i) else {
            continue;
        };
        if vector.is_empty() {
            continue;
        }
        records.push(EmbeddingRecord {
            hash: textutil::hash(text),
            source: text.clone(),
            context: contexts[i].clone(),
            file_path: String::new(),
            vector: vector.clone(),
        });
    }

    vector_store.store(&records).await?;

    info!(
        files = entries.len(),
        texts = texts.len(),
        embeddings = records.len(),
        "Ingestion complete"
    );

    Ok(())
}
