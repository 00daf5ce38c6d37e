//! Embedding client
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint. Vectors come back
//! in request order at the configured dimensionality; a mismatched
//! dimension is a hard error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub struct EmbeddingClient {
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: EmbeddingUsage,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Deserialize, Default)]
struct EmbeddingUsage {
    #[serde(default)]
    total_tokens: u64,
}

impl EmbeddingClient {
    pub fn new(api_key: &str, model: &str, base_url: &str, dimensions: usize) -> Self {
        let dimensions = if dimensions == 0 { 1024 } else { dimensions };
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dimensions,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("build embedding http client"),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Generates embeddings for a batch of texts, in request order.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            input: texts,
            model: &self.model,
            dimensions: Some(self.dimensions),
        };

        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Embedding(format!(
                "embedding API error (status {}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)?;

        let mut results: Vec<Vec<f32>> = vec![Vec::new(); texts.len()];
        for d in parsed.data {
            if d.index < results.len() {
                results[d.index] = d.embedding;
            }
        }
        self.validate_dimensions(&results)?;

        debug!(
            texts = texts.len(),
            tokens = parsed.usage.total_tokens,
            "Generated embeddings"
        );

        Ok(results)
    }

    /// Processes texts in batches of at most `batch_size`, concatenating
    /// results in order.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>> {
        let batch_size = if batch_size == 0 { 32 } else { batch_size };
        let mut all = Vec::with_capacity(texts.len());

        for (i, chunk) in texts.chunks(batch_size).enumerate() {
            let embeddings = self
                .embed(chunk)
                .await
                .map_err(|e| Error::Embedding(format!("embed batch {}: {}", i + 1, e)))?;
            all.extend(embeddings);

            info!(
                batch = i + 1,
                processed = all.len(),
                total = texts.len(),
                "Embedding progress"
            );
        }

        Ok(all)
    }

    /// Embeds a single search query.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut results = self.embed(&input).await?;
        if results.is_empty() || results[0].is_empty() {
            return Err(Error::Embedding("no embedding returned for query".into()));
        }
        Ok(results.remove(0))
    }

    fn validate_dimensions(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(Error::Embedding(format!(
                "embedding dimension mismatch for model '{}': expected {}, got {}",
                self.model,
                self.dimensions,
                bad.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Live embedding calls need a provider; these cover the local logic.

    #[test]
    fn test_dimension_validation() {
        let client = EmbeddingClient::new("", "test-model", "http://localhost", 3);
        assert!(client
            .validate_dimensions(&[vec![0.0, 1.0, 2.0]])
            .is_ok());
        assert!(client.validate_dimensions(&[vec![0.0, 1.0]]).is_err());
    }

    #[test]
    fn test_zero_dimensions_defaults() {
        let client = EmbeddingClient::new("", "m", "http://localhost/", 0);
        assert_eq!(client.dimensions(), 1024);
        assert_eq!(client.base_url, "http://localhost");
    }
}
