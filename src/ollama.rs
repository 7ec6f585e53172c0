//! Transport helpers shared by the Ollama embedding and completion clients.

use crate::error::RagError;

pub(crate) const PROVIDER: &str = "Ollama";

/// Connection failures and timeouts mean the service is unavailable; any
/// other transport error is a provider error.
pub(crate) fn map_request_error(endpoint: &str, err: reqwest::Error) -> RagError {
    if err.is_connect() || err.is_timeout() {
        RagError::ServiceUnavailable {
            service: PROVIDER.to_string(),
            endpoint: endpoint.to_string(),
            message: format!("{}. Is Ollama running? Start it with `ollama serve`", err),
        }
    } else {
        RagError::Provider {
            provider: PROVIDER.to_string(),
            message: format!("request failed: {}", err),
        }
    }
}

/// Turn a non-success HTTP response into an error, with a pull hint for
/// missing models.
pub(crate) async fn error_from_status(response: reqwest::Response, model: &str) -> RagError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 404 || body.contains("not found") {
        return RagError::Provider {
            provider: PROVIDER.to_string(),
            message: format!(
                "model '{}' not found. Pull it with: ollama pull {}",
                model, model
            ),
        };
    }

    RagError::Provider {
        provider: PROVIDER.to_string(),
        message: format!("HTTP {}: {}", status, body),
    }
}
