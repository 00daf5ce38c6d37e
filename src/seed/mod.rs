//! Seed corpus ingestion
//!
//! A seed is a manually verified source→target pair mined from version
//! control: when a translator commits a Vietnamese line over a Chinese one,
//! the diff between the two revisions yields a trusted example. Seeds are
//! persisted in Postgres, embedded into the vector store, mirrored into the
//! graph, and exported as a corpus file.

mod git;
mod graph;
mod store;
mod vectors;

pub use git::GitIngestor;
pub use graph::GraphSeeder;
pub use store::SeedStore;
pub use vectors::VectorSeeder;

use serde::{Deserialize, Serialize};

/// A source→translated pair extracted from a VCS diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEntry {
    pub source_text: String,
    pub translated_text: String,
    pub file: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub function: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub entity_type: String,
    pub hash: String,
}
