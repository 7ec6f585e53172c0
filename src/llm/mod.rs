//! Completion providers.
//!
//! Providers return a [`Completion`] rather than a raw string: any
//! internal-reasoning section a model emits is separated from the answer at
//! the adapter boundary, so nothing downstream has to string-match tags.

mod ollama;
pub mod reasoning;

pub use ollama::OllamaLlm;
pub use reasoning::{split_reasoning, strip_reasoning};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{RagError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub reasoning: Option<String>,
    pub answer: String,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}

pub fn create_completion_provider(config: &LlmConfig) -> Result<Box<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "ollama" => Ok(Box::new(OllamaLlm::new(
            &config.endpoint(),
            &config.model,
            config.temperature,
            config.timeout_secs,
        )?)),
        other => Err(RagError::InvalidConfig(format!(
            "unknown completion provider '{}'",
            other
        ))),
    }
}
