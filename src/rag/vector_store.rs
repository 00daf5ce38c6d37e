//! pgvector-backed embedding store
//!
//! Embeddings live in the `embeddings` table with a `VECTOR(D)` column;
//! upserts are keyed by the source hash and search ranks by cosine
//! distance.

use crate::error::Result;
use pgvector::Vector;
use sqlx::PgPool;
use tracing::info;

/// A text with its embedding and provenance.
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub hash: String,
    pub source: String,
    pub context: String,
    pub file_path: String,
    pub vector: Vec<f32>,
}

/// A similarity search match. `similarity` is `1 - cosine_distance`.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub source: String,
    pub context: String,
    pub similarity: f64,
}

pub struct VectorStore {
    pool: PgPool,
}

impl VectorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts embedding records by hash; existing rows are left untouched.
    pub async fn store(&self, records: &[EmbeddingRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        for r in records {
            sqlx::query(
                "INSERT INTO embeddings (hash, source, context, file_path, embedding)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (hash) DO NOTHING",
            )
            .bind(&r.hash)
            .bind(&r.source)
            .bind(&r.context)
            .bind(&r.file_path)
            .bind(Vector::from(r.vector.clone()))
            .execute(&self.pool)
            .await?;
        }

        info!(count = records.len(), "Stored embeddings");
        Ok(())
    }

    /// Finds the top-K nearest neighbours of the query vector by cosine
    /// distance.
    pub async fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let rows: Vec<(String, String, f64)> = sqlx::query_as(
            "SELECT source, context, 1 - (embedding <=> $1) AS similarity
             FROM embeddings
             ORDER BY embedding <=> $1
             LIMIT $2",
        )
        .bind(Vector::from(query_vector.to_vec()))
        .bind(top_k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(source, context, similarity)| SearchResult {
                source,
                context,
                similarity,
            })
            .collect())
    }
}
