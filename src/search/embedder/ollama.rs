use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{validate_embeddings, Embedder};
use crate::error::{RagError, Result};
use crate::ollama::{error_from_status, map_request_error, PROVIDER};

pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimensions: usize,
    client: Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl OllamaEmbedder {
    pub fn new(endpoint: &str, model: &str, dimensions: usize, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RagError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn unavailable(&self, message: impl Into<String>) -> RagError {
        RagError::ServiceUnavailable {
            service: PROVIDER.to_string(),
            endpoint: self.endpoint.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Provider {
            provider: PROVIDER.to_string(),
            message: "no embedding returned".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            truncate: true,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| map_request_error(&self.endpoint, e))?;

        if !response.status().is_success() {
            return Err(error_from_status(response, &self.model).await);
        }

        let embed_response: EmbedResponse =
            response.json().await.map_err(|e| RagError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("malformed embed response: {}", e),
            })?;

        validate_embeddings(PROVIDER, texts.len(), &embed_response.embeddings)?;
        debug!(
            model = %self.model,
            inputs = texts.len(),
            "embedded batch"
        );
        Ok(embed_response.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.unavailable(format!("health check returned {}", response.status())));
        }

        let tags: OllamaTagsResponse = response.json().await.map_err(|e| RagError::Provider {
            provider: PROVIDER.to_string(),
            message: format!("malformed tags response: {}", e),
        })?;
        let model_available = tags
            .models
            .iter()
            .any(|m| m.name.starts_with(&self.model) || m.name == format!("{}:latest", self.model));

        if !model_available {
            return Err(RagError::Provider {
                provider: PROVIDER.to_string(),
                message: format!(
                    "model '{}' not installed. Pull it with: ollama pull {}",
                    self.model, self.model
                ),
            });
        }

        Ok(())
    }
}
