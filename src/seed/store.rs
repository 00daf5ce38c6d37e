//! Seed persistence and corpus export

use super::SeedEntry;
use crate::error::Result;
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub struct SeedStore {
    pool: PgPool,
}

impl SeedStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or updates seed entries, deduplicating by hash. Returns the
    /// number of rows written; repeated runs are idempotent.
    pub async fn upsert(&self, entries: &[SeedEntry]) -> Result<usize> {
        let mut written = 0usize;

        for e in entries {
            let result = sqlx::query(
                "INSERT INTO seed_translations
                     (hash, source_text, translated_text, file, function_name, entity_type, is_seed)
                 VALUES ($1, $2, $3, $4, $5, $6, TRUE)
                 ON CONFLICT (hash) DO UPDATE SET
                     translated_text = EXCLUDED.translated_text,
                     file = EXCLUDED.file,
                     function_name = EXCLUDED.function_name,
                     entity_type = EXCLUDED.entity_type,
                     updated_at = now()",
            )
            .bind(&e.hash)
            .bind(&e.source_text)
            .bind(&e.translated_text)
            .bind(&e.file)
            .bind(&e.function)
            .bind(&e.entity_type)
            .execute(&self.pool)
            .await?;

            written += result.rows_affected() as usize;
        }

        info!(written, "Upserted seed entries");
        Ok(written)
    }

    /// Retrieves all seed entries.
    pub async fn get_all(&self) -> Result<Vec<SeedEntry>> {
        let rows: Vec<(String, String, String, String, String, String)> = sqlx::query_as(
            "SELECT hash, source_text, translated_text, file, function_name, entity_type
             FROM seed_translations
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(hash, source_text, translated_text, file, function, entity_type)| SeedEntry {
                    source_text,
                    translated_text,
                    file,
                    function,
                    entity_type,
                    hash,
                },
            )
            .collect())
    }

    /// Retrieves seed entries of one entity type.
    pub async fn get_by_entity_type(&self, entity_type: &str) -> Result<Vec<SeedEntry>> {
        let rows: Vec<(String, String, String, String, String, String)> = sqlx::query_as(
            "SELECT hash, source_text, translated_text, file, function_name, entity_type
             FROM seed_translations
             WHERE entity_type = $1
             ORDER BY created_at",
        )
        .bind(entity_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(hash, source_text, translated_text, file, function, entity_type)| SeedEntry {
                    source_text,
                    translated_text,
                    file,
                    function,
                    entity_type,
                    hash,
                },
            )
            .collect())
    }

    /// Returns source_text → translated_text over all seeds.
    pub async fn build_translation_map(&self) -> Result<HashMap<String, String>> {
        let entries = self.get_all().await?;
        Ok(entries
            .into_iter()
            .map(|e| (e.source_text, e.translated_text))
            .collect())
    }

    /// Writes the seed corpus to a TSV file.
    pub async fn export_tsv(&self, output_path: &Path) -> Result<()> {
        let entries = self.get_all().await?;

        let mut out = String::from("source_text\ttranslated_text\tfile\tfunction\tentity_type\n");
        for e in &entries {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                escape_tsv(&e.source_text),
                escape_tsv(&e.translated_text),
                e.file,
                e.function,
                e.entity_type,
            ));
        }
        std::fs::write(output_path, out)?;

        info!(path = %output_path.display(), entries = entries.len(), "Exported seed corpus to TSV");
        Ok(())
    }

    /// Writes the seed corpus to a pretty-printed JSON file.
    pub async fn export_json(&self, output_path: &Path) -> Result<()> {
        let entries = self.get_all().await?;

        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(output_path, json)?;

        info!(path = %output_path.display(), entries = entries.len(), "Exported seed corpus to JSON");
        Ok(())
    }
}

/// Escapes tabs and line breaks so each entry stays on one TSV row.
fn escape_tsv(s: &str) -> String {
    s.replace('\t', "\\t").replace('\n', "\\n").replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("a\tb"), "a\\tb");
        assert_eq!(escape_tsv("line1\nline2\r"), "line1\\nline2\\r");
        assert_eq!(escape_tsv("clean"), "clean");
    }
}
