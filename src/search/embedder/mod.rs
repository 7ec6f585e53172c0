mod ollama;

pub use ollama::OllamaEmbedder;

use async_trait::async_trait;

use crate::config::EmbedderConfig;
use crate::error::{RagError, Result};

/// Turns text into fixed-length vectors via an external model.
///
/// `embed_batch` returns one vector per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
    async fn health_check(&self) -> Result<()>;
}

pub fn create_embedder(config: &EmbedderConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        "ollama" => Ok(Box::new(OllamaEmbedder::new(
            &config.endpoint(),
            &config.model,
            config.dimensions,
            config.timeout_secs,
        )?)),
        other => Err(RagError::InvalidConfig(format!(
            "unknown embedding provider '{}'",
            other
        ))),
    }
}

/// Check that a provider honoured the one-vector-per-input contract.
pub(crate) fn validate_embeddings(
    provider: &str,
    inputs: usize,
    embeddings: &[Vec<f32>],
) -> Result<()> {
    if embeddings.len() != inputs {
        return Err(RagError::Provider {
            provider: provider.to_string(),
            message: format!(
                "expected {} embeddings, received {}",
                inputs,
                embeddings.len()
            ),
        });
    }
    if let Some(first) = embeddings.first() {
        if first.is_empty() {
            return Err(RagError::Provider {
                provider: provider.to_string(),
                message: "received an empty embedding".to_string(),
            });
        }
        if let Some(bad) = embeddings.iter().find(|v| v.len() != first.len()) {
            return Err(RagError::Provider {
                provider: provider.to_string(),
                message: format!(
                    "embeddings have inconsistent dimensions ({} vs {})",
                    first.len(),
                    bad.len()
                ),
            });
        }
    }
    Ok(())
}
