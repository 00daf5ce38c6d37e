//! Two-tier translation cache
//!
//! An in-memory map in front of the `translation_cache` table, keyed by the
//! SHA-256 of the source string. Reads fall through to Postgres and warm the
//! memory tier; writes hit both. A preload pass pulls the whole durable tier
//! into memory before a translation run.

use crate::error::Result;
use crate::textutil;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

pub struct TranslationCache {
    pool: PgPool,
    memory: RwLock<HashMap<String, String>>, // hash → translated text
}

impl TranslationCache {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            memory: RwLock::new(HashMap::new()),
        }
    }

    /// Retrieves a cached translation, or `None` on a full miss.
    pub async fn get(&self, source_text: &str) -> Option<String> {
        let hash = textutil::hash(source_text);

        {
            let memory = self.memory.read().expect("cache lock poisoned");
            if let Some(v) = memory.get(&hash) {
                return Some(v.clone());
            }
        }

        let row: Option<(String,)> =
            sqlx::query_as("SELECT translated FROM translation_cache WHERE hash = $1")
                .bind(&hash)
                .fetch_optional(&self.pool)
                .await
                .ok()
                .flatten();

        let translated = row.map(|(t,)| t)?;

        let mut memory = self.memory.write().expect("cache lock poisoned");
        memory.insert(hash, translated.clone());
        Some(translated)
    }

    /// Stores a translation in both tiers. Last writer wins.
    pub async fn set(&self, source_text: &str, translated: &str) -> Result<()> {
        let hash = textutil::hash(source_text);

        {
            let mut memory = self.memory.write().expect("cache lock poisoned");
            memory.insert(hash.clone(), translated.to_string());
        }

        sqlx::query(
            "INSERT INTO translation_cache (hash, source, translated)
             VALUES ($1, $2, $3)
             ON CONFLICT (hash) DO UPDATE SET translated = EXCLUDED.translated",
        )
        .bind(&hash)
        .bind(source_text)
        .bind(translated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stores multiple translations.
    pub async fn set_batch(&self, pairs: &HashMap<String, String>) -> Result<()> {
        for (source, translated) in pairs {
            self.set(source, translated).await?;
        }
        Ok(())
    }

    /// Loads the entire durable tier into memory.
    pub async fn preload(&self) -> Result<()> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT hash, translated FROM translation_cache")
                .fetch_all(&self.pool)
                .await?;

        let count = rows.len();
        let mut memory = self.memory.write().expect("cache lock poisoned");
        for (hash, translated) in rows {
            memory.insert(hash, translated);
        }

        info!(count, "Preloaded translation cache");
        Ok(())
    }
}
