//! Seed embeddings
//!
//! Seed sources are embedded like any other text but carry a `seed=true`
//! context marker so retrieval hits reveal their provenance and the
//! verified translation rides along in the context string.

use super::SeedEntry;
use crate::error::{Error, Result};
use crate::rag::{EmbeddingClient, EmbeddingRecord, VectorStore};
use crate::textutil;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub struct VectorSeeder {
    embedding_client: Arc<EmbeddingClient>,
    vector_store: Arc<VectorStore>,
}

impl VectorSeeder {
    pub fn new(embedding_client: Arc<EmbeddingClient>, vector_store: Arc<VectorStore>) -> Self {
        Self {
            embedding_client,
            vector_store,
        }
    }

    /// Embeds unique seed sources and stores them in the vector store.
    pub async fn ingest_embeddings(&self, entries: &[SeedEntry], batch_size: usize) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut texts = Vec::new();
        let mut contexts = Vec::new();
        let mut hashes = Vec::new();

        for e in entries {
            if !seen.insert(e.hash.clone()) {
                continue;
            }
            texts.push(e.source_text.clone());
            contexts.push(build_seed_context(e));
            hashes.push(e.hash.clone());
        }

        info!(unique_texts = texts.len(), "Generating seed embeddings");

        let embeddings = self
            .embedding_client
            .embed_batch(&texts, batch_size)
            .await
            .map_err(|e| Error::Embedding(format!("generate seed embeddings: {}", e)))?;

        let mut records = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            match embeddings.get(i) {
                Some(vector) if !vector.is_empty() => records.push(EmbeddingRecord {
                    hash: hashes[i].clone(),
                    source: text.clone(),
                    context: contexts[i].clone(),
                    file_path: String::new(),
                    vector: vector.clone(),
                }),
                _ => {
                    warn!(text = %textutil::truncate(text, 30), "Missing embedding for seed text");
                }
            }
        }

        self.vector_store.store(&records).await?;

        info!(stored = records.len(), "Seed embeddings stored");
        Ok(())
    }
}

/// Context string for a seed embedding, marked for prioritized retrieval.
fn build_seed_context(e: &SeedEntry) -> String {
    let mut ctx = format!("seed=true; entity_type={}; file={}", e.entity_type, e.file);
    if !e.function.is_empty() {
        ctx.push_str(&format!("; function={}", e.function));
    }
    ctx.push_str(&format!("; translated={}", e.translated_text));
    ctx
}
