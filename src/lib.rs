//! gameloc: GraphRAG localization pipeline for wuxia MMORPG game scripts
//!
//! Extracts translatable Chinese strings from .lua/.ini/.txt game files,
//! indexes them into a pgvector store and a Neo4j terminology graph, and
//! translates them to Vietnamese through an LLM with retrieval-augmented
//! prompts, writing results back into the original file shells.

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod interpolation;
pub mod parsers;
pub mod pool;
pub mod rag;
pub mod seed;
pub mod textutil;
pub mod translation;
pub mod walker;

pub use error::{Error, Result};
