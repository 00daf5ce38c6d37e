//! Three-source retrieval
//!
//! Composes seed translations, vector neighbours, and graph terminology
//! into one context bundle. The channels are independent: a failing one
//! logs a warning and contributes nothing, and translation proceeds with
//! whatever context exists. Seeds render first — they are manually
//! verified and the prompt treats them as authoritative.

use super::{EmbeddingClient, SearchResult, VectorStore};
use crate::error::Result;
use crate::graph::{GraphQuerier, QueryResult};
use crate::textutil;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::warn;

/// Lookup of verified seed translations relevant to a source text.
#[async_trait]
pub trait SeedQuerier: Send + Sync {
    async fn find_seed_translations(&self, text: &str) -> Result<HashMap<String, String>>;
}

/// Combined retrieval context for one translation request.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    /// Manually verified pairs from the seed corpus (highest priority).
    pub seed_translations: HashMap<String, String>,
    /// Nearest neighbours from vector search.
    pub similar_texts: Vec<SearchResult>,
    /// Terminology and relationships from the knowledge graph.
    pub graph_context: QueryResult,
}

pub struct Retriever {
    vector_store: Arc<VectorStore>,
    embedding_client: Arc<EmbeddingClient>,
    graph_querier: Arc<GraphQuerier>,
    seed_querier: Option<Arc<dyn SeedQuerier>>,
}

impl Retriever {
    pub fn new(
        vector_store: Arc<VectorStore>,
        embedding_client: Arc<EmbeddingClient>,
        graph_querier: Arc<GraphQuerier>,
    ) -> Self {
        Self {
            vector_store,
            embedding_client,
            graph_querier,
            seed_querier: None,
        }
    }

    /// Attaches a seed querier for prioritized seed retrieval.
    pub fn set_seed_querier(&mut self, querier: Arc<dyn SeedQuerier>) {
        self.seed_querier = Some(querier);
    }

    /// Fetches context for a source text. Priority order: seed translations,
    /// then vector neighbours, then graph terminology.
    pub async fn retrieve(&self, source_text: &str, top_k: usize) -> RetrievalResult {
        let mut result = RetrievalResult::default();

        if let Some(seeds) = &self.seed_querier {
            match seeds.find_seed_translations(source_text).await {
                Ok(pairs) => result.seed_translations = pairs,
                Err(e) => warn!(error = %e, "Seed query failed"),
            }
        }

        match self.embedding_client.embed_query(source_text).await {
            Ok(query_vec) => match self.vector_store.search(&query_vec, top_k).await {
                Ok(similar) => result.similar_texts = similar,
                Err(e) => warn!(error = %e, "Vector search failed"),
            },
            Err(e) => {
                warn!(
                    error = %e,
                    text = %textutil::truncate(source_text, 50),
                    "Failed to embed query, skipping vector search"
                );
            }
        }

        match self.graph_querier.find_related_terms(source_text).await {
            Ok(graph_ctx) => result.graph_context = graph_ctx,
            Err(e) => warn!(error = %e, "Graph query failed"),
        }

        result
    }

    /// Renders retrieval results into the prompt context block. The section
    /// order is a contract: seeds come first so the model treats them as
    /// authoritative.
    pub fn build_context_string(result: &RetrievalResult) -> String {
        let mut out = String::new();

        if !result.seed_translations.is_empty() {
            out.push_str("=== Verified Seed Translations (USE THESE AS REFERENCE) ===\n");
            for (src, dst) in &result.seed_translations {
                let _ = writeln!(out, "• {} → {}", src, dst);
            }
            out.push('\n');
        }

        if !result.similar_texts.is_empty() {
            out.push_str("=== Similar Translations ===\n");
            for (i, st) in result.similar_texts.iter().enumerate() {
                let _ = write!(out, "{}. [Score: {:.3}] {}", i + 1, st.similarity, st.source);
                if !st.context.is_empty() {
                    let _ = write!(out, " (Context: {})", st.context);
                }
                out.push('\n');
            }
            out.push('\n');
        }

        if !result.graph_context.terms.is_empty() {
            out.push_str("=== Terminology from Knowledge Graph ===\n");
            for term in &result.graph_context.terms {
                let _ = write!(out, "• {} → {}", term.chinese, term.vietnamese);
                if !term.category.is_empty() {
                    let _ = write!(out, " [{}]", term.category);
                }
                out.push('\n');
            }
            out.push('\n');

            if !result.graph_context.relationships.is_empty() {
                out.push_str("=== Entity Relationships ===\n");
                for rel in &result.graph_context.relationships {
                    let _ = writeln!(out, "• {} -[{}]-> {}", rel.from, rel.rel_type, rel.to);
                }
                out.push('\n');
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RelationshipResult, TermResult};

    #[test]
    fn test_context_string_empty_result() {
        assert_eq!(
            Retriever::build_context_string(&RetrievalResult::default()),
            ""
        );
    }

    #[test]
    fn test_seed_section_precedes_all_others() {
        let mut result = RetrievalResult::default();
        result
            .seed_translations
            .insert("真气".to_string(), "Chân khí".to_string());
        result.similar_texts.push(SearchResult {
            source: "真气护体".to_string(),
            context: "file=skill.lua".to_string(),
            similarity: 0.92,
        });
        result.graph_context.terms.push(TermResult {
            chinese: "真气".to_string(),
            vietnamese: "Chân khí".to_string(),
            category: "cultivation".to_string(),
        });

        let ctx = Retriever::build_context_string(&result);
        let seed_pos = ctx.find("=== Verified Seed Translations").unwrap();
        let similar_pos = ctx.find("=== Similar Translations ===").unwrap();
        let term_pos = ctx.find("=== Terminology from Knowledge Graph ===").unwrap();
        assert!(seed_pos < similar_pos);
        assert!(similar_pos < term_pos);
        assert!(ctx[seed_pos..similar_pos].contains("真气 → Chân khí"));
    }

    #[test]
    fn test_relationship_section_requires_terms() {
        let mut result = RetrievalResult::default();
        result.graph_context.relationships.push(RelationshipResult {
            from: "真气".to_string(),
            rel_type: "USED_IN".to_string(),
            to: "技能".to_string(),
        });
        // No terms matched, so the relationship section stays out too.
        assert_eq!(Retriever::build_context_string(&result), "");
    }

    #[test]
    fn test_similar_translation_formatting() {
        let mut result = RetrievalResult::default();
        result.similar_texts.push(SearchResult {
            source: "获得经验".to_string(),
            context: String::new(),
            similarity: 0.875,
        });
        let ctx = Retriever::build_context_string(&result);
        assert!(ctx.contains("1. [Score: 0.875] 获得经验\n"));
        assert!(!ctx.contains("(Context:"));
    }
}
