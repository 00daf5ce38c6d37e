//! Environment-driven configuration
//!
//! All knobs come from the environment (a local `.env` file is honoured).
//! Missing values fall back to the documented defaults; values that are
//! present but unparsable are a fatal configuration error.

use crate::error::{Error, Result};
use tracing::warn;

/// Runtime configuration for all pipeline flows.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string (cache, seeds, embeddings).
    pub database_url: String,
    /// Bolt URI of the knowledge graph.
    pub graph_uri: String,
    pub graph_user: String,
    pub graph_password: String,
    /// Parser/reconstruction parallelism.
    pub worker_count: usize,
    /// Items per embed/translate batch.
    pub batch_size: usize,
    /// Outbound API concurrency gate.
    pub max_concurrent_api_calls: usize,
    pub embedding_api_key: String,
    pub embedding_model: String,
    pub embedding_base_url: String,
    pub embedding_dimensions: usize,
    pub translation_model: String,
    pub llm_api_key: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        if dotenvy::dotenv().is_err() {
            warn!("No .env file found, using environment variables");
        }

        Ok(Self {
            database_url: get_env(
                "DATABASE_URL",
                "postgres://localhost:5432/gameloc?sslmode=disable",
            ),
            graph_uri: get_env("GRAPH_URI", "bolt://localhost:7687"),
            graph_user: get_env("GRAPH_USER", "neo4j"),
            graph_password: get_env("GRAPH_PASSWORD", "password"),
            worker_count: get_env_usize("WORKER_COUNT", 8)?,
            batch_size: get_env_usize("BATCH_SIZE", 10)?,
            max_concurrent_api_calls: get_env_usize("MAX_CONCURRENT_API_CALLS", 5)?,
            embedding_api_key: get_env("EMBEDDING_API_KEY", ""),
            embedding_model: get_env("EMBEDDING_MODEL", "Qwen/Qwen3-Embedding-0.6B"),
            embedding_base_url: get_env(
                "EMBEDDING_BASE_URL",
                "https://dashscope.aliyuncs.com/compatible-mode/v1",
            ),
            embedding_dimensions: get_env_usize("EMBEDDING_DIMENSIONS", 1024)?,
            translation_model: get_env("TRANSLATION_MODEL", "claude-sonnet-4-20250514"),
            llm_api_key: get_env("LLM_API_KEY", ""),
        })
    }
}

fn get_env(key: &str, fallback: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}

fn get_env_usize(key: &str, fallback: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a positive integer, got '{}'", key, v))),
        _ => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_usize_fallback() {
        assert_eq!(get_env_usize("GAMELOC_TEST_UNSET_VAR", 7).unwrap(), 7);
    }

    #[test]
    fn test_get_env_usize_invalid_is_fatal() {
        std::env::set_var("GAMELOC_TEST_BAD_INT", "not-a-number");
        let err = get_env_usize("GAMELOC_TEST_BAD_INT", 7).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        std::env::remove_var("GAMELOC_TEST_BAD_INT");
    }
}
