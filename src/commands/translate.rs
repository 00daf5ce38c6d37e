//! `translate` flow: cache-aware batch translation and file reconstruction

use crate::cache::TranslationCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::GraphQuerier;
use crate::interpolation;
use crate::parsers::ParseResult;
use crate::pool::{self, Pool};
use crate::rag::{EmbeddingClient, Retriever, VectorStore};
use crate::seed::GraphSeeder;
use crate::textutil;
use crate::translation::{split_batch_response, PromptBuilder, TranslatorClient};
use crate::walker::{FileEntry, Walker};
use neo4rs::Graph;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub async fn cmd_translate(
    config: &Config,
    pg: PgPool,
    graph: Graph,
    token: &CancellationToken,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    let vector_store = Arc::new(VectorStore::new(pg.clone()));
    let embedding_client = Arc::new(EmbeddingClient::new(
        &config.embedding_api_key,
        &config.embedding_model,
        &config.embedding_base_url,
        config.embedding_dimensions,
    ));
    let graph_querier = Arc::new(GraphQuerier::new(graph.clone()));

    let mut retriever = Retriever::new(vector_store, embedding_client, graph_querier.clone());
    retriever.set_seed_querier(Arc::new(GraphSeeder::new(graph)));
    let retriever = Arc::new(retriever);

    let prompt_builder = Arc::new(PromptBuilder::new());
    let translator = Arc::new(TranslatorClient::new(
        &config.llm_api_key,
        &config.translation_model,
    ));
    let cache = Arc::new(TranslationCache::new(pg));

    if let Err(e) = cache.preload().await {
        warn!(error = %e, "Failed to preload cache");
    }

    let terminology = match graph_querier.get_all_terminology().await {
        Ok(map) => Arc::new(map),
        Err(e) => {
            warn!(error = %e, "Failed to load terminology");
            Arc::new(HashMap::new())
        }
    };

    let entries = Walker::new().walk(input_dir)?;
    info!(files = entries.len(), "Starting translation pipeline");

    std::fs::create_dir_all(output_dir)?;

    let parse_pool = Pool::new(
        config.worker_count,
        |_token: CancellationToken, entry: FileEntry| async move { entry.parser.parse(&entry.path) },
    );
    let parse_results = parse_pool.execute(token, entries).await;

    // Deduplicated texts that are not already cached.
    let mut seen: HashSet<String> = HashSet::new();
    let mut to_translate: Vec<String> = Vec::new();
    for task in &parse_results {
        let Ok(result) = &task.result else { continue };
        for et in &result.texts {
            if !seen.insert(et.text.clone()) {
                continue;
            }
            if cache.get(&et.text).await.is_some() {
                continue;
            }
            to_translate.push(et.text.clone());
        }
    }

    info!(
        total_unique = seen.len(),
        to_translate = to_translate.len(),
        "Translation plan"
    );

    let batches = pool::batch(to_translate, config.batch_size);
    let total_batches = batches.len();
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_api_calls));

    let mut tasks = JoinSet::new();
    for (batch_idx, batch) in batches.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let retriever = Arc::clone(&retriever);
        let prompt_builder = Arc::clone(&prompt_builder);
        let translator = Arc::clone(&translator);
        let cache = Arc::clone(&cache);
        let terminology = Arc::clone(&terminology);
        let token = token.clone();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            if token.is_cancelled() {
                return;
            }

            info!(
                batch = batch_idx + 1,
                total_batches,
                size = batch.len(),
                "Translating batch"
            );

            translate_batch(
                &batch,
                &token,
                &retriever,
                &prompt_builder,
                &translator,
                &cache,
                &terminology,
            )
            .await;
        });
    }
    while tasks.join_next().await.is_some() {}

    // Reconstruct files from whatever the cache now holds.
    let input_abs = input_dir
        .canonicalize()
        .map_err(|e| Error::InvalidPath(format!("{}: {}", input_dir.display(), e)))?;
    let output_abs = std::path::absolute(output_dir)?;

    let recon_inputs: Vec<(FileEntry, ParseResult)> = parse_results
        .into_iter()
        .filter_map(|task| match task.result {
            Ok(result) => Some((task.input, result)),
            Err(_) => None,
        })
        .collect();

    let recon_cache = Arc::clone(&cache);
    let recon_pool = Pool::new(config.worker_count, {
        move |_token: CancellationToken, (entry, result): (FileEntry, ParseResult)| {
            let cache = Arc::clone(&recon_cache);
            let input_abs = input_abs.clone();
            let output_abs = output_abs.clone();
            async move {
                reconstruct_file(&cache, &input_abs, &output_abs, &entry, &result).await
            }
        }
    });

    let recon_results = recon_pool.execute(token, recon_inputs).await;
    let written = recon_results
        .iter()
        .filter(|task| task.result.is_ok())
        .count();

    info!(
        files = written,
        output = %output_dir.display(),
        "Translation pipeline complete"
    );

    Ok(())
}

/// Translates one batch and caches every recovered slot. Failures are
/// logged, never propagated: the pipeline keeps moving.
async fn translate_batch(
    batch: &[String],
    token: &CancellationToken,
    retriever: &Retriever,
    prompt_builder: &PromptBuilder,
    translator: &TranslatorClient,
    cache: &TranslationCache,
    terminology: &HashMap<String, String>,
) {
    // Protect interpolation variables per item.
    let mut protected = Vec::with_capacity(batch.len());
    let mut mappings = Vec::with_capacity(batch.len());
    for text in batch {
        let (safe, mapping) = interpolation::protect(text);
        protected.push(safe);
        mappings.push(mapping);
    }

    // Terminology relevant to anything in the batch.
    let mut relevant_terms = HashMap::new();
    for text in batch {
        for (zh, vi) in terminology {
            if text.contains(zh.as_str()) {
                relevant_terms.insert(zh.clone(), vi.clone());
            }
        }
    }

    let user_prompt = prompt_builder.build_batch_user_prompt(&protected, &relevant_terms);
    let response = match translator
        .translate(token, prompt_builder.system_prompt(), &user_prompt)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Batch translation failed");
            return;
        }
    };

    let slots = split_batch_response(&response, batch.len());
    for (i, text) in batch.iter().enumerate() {
        match &slots[i] {
            Some(piece) => {
                let translated = interpolation::restore(piece, &mappings[i]);
                if let Err(e) = cache.set(text, &translated).await {
                    warn!(error = %e, "Failed to cache translation");
                }
            }
            None => {
                warn!(
                    text = %textutil::truncate(text, 30),
                    "Missing translation in batch response, using fallback"
                );
                translate_single(text, token, retriever, prompt_builder, translator, cache).await;
            }
        }
    }
}

/// Single-item fallback with its own retrieved context.
async fn translate_single(
    text: &str,
    token: &CancellationToken,
    retriever: &Retriever,
    prompt_builder: &PromptBuilder,
    translator: &TranslatorClient,
    cache: &TranslationCache,
) {
    let retrieval = retriever.retrieve(text, 3).await;
    let context = Retriever::build_context_string(&retrieval);

    let (safe, mapping) = interpolation::protect(text);
    let user_prompt = prompt_builder.build_user_prompt(&safe, &context);

    match translator
        .translate(token, prompt_builder.system_prompt(), &user_prompt)
        .await
    {
        Ok(individual) => {
            let translated = interpolation::restore(&individual, &mapping);
            if let Err(e) = cache.set(text, &translated).await {
                warn!(error = %e, "Failed to cache translation");
            }
        }
        Err(e) => {
            error!(error = %e, text = %textutil::truncate(text, 30), "Individual translation failed");
        }
    }
}

/// Rebuilds one file with cache-resident translations and writes it under
/// the mirrored output tree.
async fn reconstruct_file(
    cache: &TranslationCache,
    input_abs: &Path,
    output_abs: &Path,
    entry: &FileEntry,
    result: &ParseResult,
) -> Result<()> {
    let mut translations = HashMap::new();
    for et in &result.texts {
        if let Some(translated) = cache.get(&et.text).await {
            translations.insert(et.text.clone(), translated);
        }
    }

    let reconstructed = entry.parser.reconstruct(result, &translations)?;

    let rel = entry
        .path
        .strip_prefix(input_abs)
        .map_err(|_| Error::InvalidPath(format!("{} not under input root", entry.path.display())))?;
    let out_path = output_abs.join(rel);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&out_path, reconstructed)?;

    info!(
        input = %entry.path.display(),
        output = %out_path.display(),
        translations = translations.len(),
        "File translated"
    );

    Ok(())
}
