//! Custom error types for gameloc

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl From<neo4rs::Error> for Error {
    fn from(err: neo4rs::Error) -> Self {
        Error::Graph(err.to_string())
    }
}

/// Result type alias for gameloc
pub type Result<T> = std::result::Result<T, Error>;
