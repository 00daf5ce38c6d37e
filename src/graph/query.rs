//! Translation-time graph queries

use crate::error::Result;
use neo4rs::{query, Graph};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A terminology match.
#[derive(Debug, Clone)]
pub struct TermResult {
    pub chinese: String,
    pub vietnamese: String,
    pub category: String,
}

/// A directed relationship between two terms.
#[derive(Debug, Clone)]
pub struct RelationshipResult {
    pub from: String,
    pub rel_type: String,
    pub to: String,
}

/// Combined result of a graph lookup.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub terms: Vec<TermResult>,
    pub relationships: Vec<RelationshipResult>,
}

pub struct GraphQuerier {
    graph: Graph,
}

impl GraphQuerier {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// Finds every term whose Chinese string appears in `text` (longest
    /// first), plus the one-hop relationships among the matched terms.
    pub async fn find_related_terms(&self, text: &str) -> Result<QueryResult> {
        let mut result = QueryResult::default();

        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (t:Term)
                     WHERE $text CONTAINS t.chinese
                     RETURN t.chinese AS chinese, t.vietnamese AS vietnamese, t.category AS category
                     ORDER BY size(t.chinese) DESC",
                )
                .param("text", text),
            )
            .await?;

        while let Some(row) = rows.next().await? {
            result.terms.push(TermResult {
                chinese: row.get("chinese").unwrap_or_default(),
                vietnamese: row.get("vietnamese").unwrap_or_default(),
                category: row.get("category").unwrap_or_default(),
            });
        }

        if result.terms.is_empty() {
            return Ok(result);
        }

        let rels = self
            .graph
            .execute(
                query(
                    "MATCH (t:Term)
                     WHERE $text CONTAINS t.chinese
                     MATCH (t)-[r]->(neighbor:Term)
                     RETURN t.chinese AS from_node, type(r) AS rel_type, neighbor.chinese AS to_node
                     UNION
                     MATCH (t:Term)
                     WHERE $text CONTAINS t.chinese
                     MATCH (neighbor:Term)-[r]->(t)
                     RETURN neighbor.chinese AS from_node, type(r) AS rel_type, t.chinese AS to_node",
                )
                .param("text", text),
            )
            .await;

        match rels {
            Ok(mut rows) => {
                while let Some(row) = rows.next().await? {
                    result.relationships.push(RelationshipResult {
                        from: row.get("from_node").unwrap_or_default(),
                        rel_type: row.get("rel_type").unwrap_or_default(),
                        to: row.get("to_node").unwrap_or_default(),
                    });
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to query relationships");
                return Ok(result);
            }
        }

        debug!(
            terms = result.terms.len(),
            relationships = result.relationships.len(),
            "Graph query complete"
        );

        Ok(result)
    }

    /// Returns every (chinese, vietnamese) pair as a lookup map.
    pub async fn get_all_terminology(&self) -> Result<HashMap<String, String>> {
        let mut rows = self
            .graph
            .execute(query(
                "MATCH (t:Term)
                 RETURN t.chinese AS chinese, t.vietnamese AS vietnamese",
            ))
            .await?;

        let mut terms = HashMap::new();
        while let Some(row) = rows.next().await? {
            let chinese: String = row.get("chinese").unwrap_or_default();
            let vietnamese: String = row.get("vietnamese").unwrap_or_default();
            terms.insert(chinese, vietnamese);
        }

        info!(count = terms.len(), "Loaded terminology from graph");
        Ok(terms)
    }
}
