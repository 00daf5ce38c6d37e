//! Terminology knowledge graph
//!
//! Neo4j holds the bilingual wuxia terminology, typed relationships between
//! terms, and a node per ingested source string. Translation-time queries
//! pull the terms contained in a text plus their one-hop neighbourhood.

mod builder;
mod query;
mod terminology;

pub use builder::GraphBuilder;
pub use query::{GraphQuerier, QueryResult, RelationshipResult, TermResult};
pub use terminology::{RELATIONSHIPS, TERMS};

use crate::config::Config;
use crate::error::Result;
use neo4rs::Graph;

/// Opens the Bolt connection and verifies it responds.
pub async fn connect(config: &Config) -> Result<Graph> {
    let graph = Graph::new(
        config.graph_uri.as_str(),
        config.graph_user.as_str(),
        config.graph_password.as_str(),
    )
    .await?;

    // Cheap liveness probe; startup fails fast on bad credentials.
    graph.run(neo4rs::query("RETURN 1")).await?;

    Ok(graph)
}
