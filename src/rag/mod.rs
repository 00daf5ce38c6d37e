//! Retrieval-augmented generation substrate
//!
//! - `embed`: batched text→vector client over an OpenAI-compatible endpoint
//! - `vector_store`: pgvector-backed embedding storage and cosine search
//! - `retrieve`: merges seeds, vector neighbours, and graph context into a
//!   single prompt-ready bundle

mod embed;
mod retrieve;
mod vector_store;

pub use embed::EmbeddingClient;
pub use retrieve::{RetrievalResult, Retriever, SeedQuerier};
pub use vector_store::{EmbeddingRecord, SearchResult, VectorStore};
