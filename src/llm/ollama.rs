use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::reasoning::split_reasoning;
use super::{Completion, CompletionProvider};
use crate::error::{RagError, Result};
use crate::ollama::{error_from_status, map_request_error, PROVIDER};

pub struct OllamaLlm {
    endpoint: String,
    model: String,
    temperature: f32,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    thinking: Option<String>,
}

impl GenerateResponse {
    fn into_completion(self) -> Completion {
        // Servers that report thinking separately still get their response
        // cleaned, in case the model echoed tags anyway.
        let mut completion = split_reasoning(&self.response);
        if let Some(thinking) = self.thinking.map(|t| t.trim().to_string()) {
            if !thinking.is_empty() {
                completion.reasoning = Some(match completion.reasoning {
                    Some(inline) => format!("{}\n\n{}", thinking, inline),
                    None => thinking,
                });
            }
        }
        completion
    }
}

impl OllamaLlm {
    pub fn new(endpoint: &str, model: &str, temperature: f32, timeout_secs: u64) -> Result<Self> {
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
            temperature,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OllamaLlm {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| map_request_error(&self.endpoint, e))?;

        if !response.status().is_success() {
            return Err(error_from_status(response, &self.model).await);
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| RagError::Provider {
            provider: PROVIDER.to_string(),
            message: format!("malformed generate response: {}", e),
        })?;

        debug!(model = %self.model, chars = generated.response.len(), "completion received");
        Ok(generated.into_completion())
    }
}
