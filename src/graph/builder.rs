//! Graph schema and terminology seeding

use super::terminology::{RELATIONSHIPS, TERMS};
use crate::error::Result;
use neo4rs::{query, Graph};
use tracing::{info, warn};

/// Seeds and updates the knowledge graph.
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// Creates the uniqueness constraints the pipeline relies on.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.graph
            .run(query(
                "CREATE CONSTRAINT IF NOT EXISTS FOR (t:Term) REQUIRE t.chinese IS UNIQUE",
            ))
            .await?;

        info!("Graph schema ensured");
        Ok(())
    }

    /// Upserts the bundled terminology and its relationships.
    pub async fn seed_terminology(&self) -> Result<()> {
        for (chinese, vietnamese, category) in TERMS {
            self.graph
                .run(
                    query(
                        "MERGE (t:Term {chinese: $chinese})
                         SET t.vietnamese = $vietnamese,
                             t.category = $category",
                    )
                    .param("chinese", *chinese)
                    .param("vietnamese", *vietnamese)
                    .param("category", *category),
                )
                .await?;
        }
        info!(terms = TERMS.len(), "Seeded terminology nodes");

        for (from, rel_type, to) in RELATIONSHIPS {
            // Relationship types cannot be parameterised; they come from the
            // fixed table above, never from input.
            let cypher = format!(
                "MATCH (a:Term {{chinese: $from}})
                 MATCH (b:Term {{chinese: $to}})
                 MERGE (a)-[:{}]->(b)",
                rel_type
            );
            if let Err(e) = self
                .graph
                .run(query(&cypher).param("from", *from).param("to", *to))
                .await
            {
                warn!(error = %e, from, to, rel = rel_type, "Failed to create relationship");
            }
        }
        info!(
            relationships = RELATIONSHIPS.len(),
            "Seeded terminology relationships"
        );

        Ok(())
    }

    /// Records an ingested source string as a TextNode and links it to every
    /// term it contains.
    pub async fn add_entity_from_text(
        &self,
        text: &str,
        file_path: &str,
        context: &str,
    ) -> Result<()> {
        self.graph
            .run(
                query(
                    "MERGE (t:TextNode {text: $text})
                     SET t.file = $file, t.context = $context",
                )
                .param("text", text)
                .param("file", file_path)
                .param("context", context),
            )
            .await?;

        self.graph
            .run(
                query(
                    "MATCH (term:Term)
                     WHERE $text CONTAINS term.chinese
                     MATCH (t:TextNode {text: $text})
                     MERGE (t)-[:CONTAINS_TERM]->(term)",
                )
                .param("text", text),
            )
            .await?;

        Ok(())
    }
}
