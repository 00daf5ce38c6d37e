//! LLM translation layer
//!
//! - `prompt`: renders the fixed system prompt and the user prompts that
//!   carry retrieval context and the batch delimiter protocol
//! - `client`: one HTTP call per batch against the Anthropic Messages API
//!   with bounded retry and cancellable backoff

mod client;
mod prompt;

pub use client::{split_batch_response, TranslatorClient};
pub use prompt::PromptBuilder;
