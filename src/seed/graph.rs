//! Seed nodes in the knowledge graph

use super::SeedEntry;
use crate::error::Result;
use crate::rag::SeedQuerier;
use async_trait::async_trait;
use neo4rs::{query, Graph};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Mirrors seed entries into the graph and serves prioritized seed lookups.
pub struct GraphSeeder {
    graph: Graph,
}

impl GraphSeeder {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// Creates the uniqueness constraint for seed nodes.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.graph
            .run(query(
                "CREATE CONSTRAINT IF NOT EXISTS FOR (s:SeedTranslation) REQUIRE s.hash IS UNIQUE",
            ))
            .await?;

        info!("Graph seed schema ensured");
        Ok(())
    }

    /// Creates or updates SeedTranslation nodes and links them to the terms
    /// they demonstrate and the TextNode they translate.
    pub async fn upsert_seed_nodes(&self, entries: &[SeedEntry]) -> Result<()> {
        for e in entries {
            let upsert = self
                .graph
                .run(
                    query(
                        "MERGE (s:SeedTranslation {hash: $hash})
                         SET s.source_text = $source,
                             s.translated_text = $translated,
                             s.file = $file,
                             s.function_name = $function,
                             s.entity_type = $entity_type,
                             s.is_seed = true",
                    )
                    .param("hash", e.hash.as_str())
                    .param("source", e.source_text.as_str())
                    .param("translated", e.translated_text.as_str())
                    .param("file", e.file.as_str())
                    .param("function", e.function.as_str())
                    .param("entity_type", e.entity_type.as_str()),
                )
                .await;
            if let Err(err) = upsert {
                warn!(error = %err, hash = %e.hash, "Failed to upsert seed node");
                continue;
            }

            let link_terms = self
                .graph
                .run(
                    query(
                        "MATCH (term:Term)
                         WHERE $source CONTAINS term.chinese
                         MATCH (s:SeedTranslation {hash: $hash})
                         MERGE (s)-[:DEMONSTRATES_TERM]->(term)",
                    )
                    .param("source", e.source_text.as_str())
                    .param("hash", e.hash.as_str()),
                )
                .await;
            if let Err(err) = link_terms {
                warn!(error = %err, hash = %e.hash, "Failed to link seed to terms");
            }

            let link_text = self
                .graph
                .run(
                    query(
                        "MATCH (t:TextNode {text: $source})
                         MATCH (s:SeedTranslation {hash: $hash})
                         MERGE (s)-[:TRANSLATES]->(t)",
                    )
                    .param("source", e.source_text.as_str())
                    .param("hash", e.hash.as_str()),
                )
                .await;
            if link_text.is_err() {
                // The TextNode may simply not exist yet.
                debug!(hash = %e.hash, "No matching TextNode for seed");
            }
        }

        info!(entries = entries.len(), "Upserted seed nodes in graph");
        Ok(())
    }
}

#[async_trait]
impl SeedQuerier for GraphSeeder {
    /// Finds seeds whose source text overlaps the query either way, plus
    /// seeds demonstrating any term contained in the query. Duplicates
    /// collapse into the returned map.
    async fn find_seed_translations(&self, text: &str) -> Result<HashMap<String, String>> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (s:SeedTranslation)
                     WHERE $text CONTAINS s.source_text
                        OR s.source_text CONTAINS $text
                     RETURN s.source_text AS source, s.translated_text AS translated
                     UNION
                     MATCH (term:Term)
                     WHERE $text CONTAINS term.chinese
                     MATCH (s:SeedTranslation)-[:DEMONSTRATES_TERM]->(term)
                     RETURN s.source_text AS source, s.translated_text AS translated",
                )
                .param("text", text),
            )
            .await?;

        let mut pairs = HashMap::new();
        while let Some(row) = rows.next().await? {
            let source: String = row.get("source").unwrap_or_default();
            let translated: String = row.get("translated").unwrap_or_default();
            pairs.insert(source, translated);
        }

        Ok(pairs)
    }
}
