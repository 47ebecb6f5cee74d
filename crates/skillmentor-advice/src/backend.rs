use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use skillmentor_core::config::GeneratorSettings;
use skillmentor_core::traits::CompletionBackend;
use skillmentor_core::{Error, Result};

/// Completion backend talking to a local Ollama server.
pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {}", e)))?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), model: model.into(), client })
    }

    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self> {
        Self::new(&settings.base_url, &settings.model, Duration::from_millis(settings.timeout_ms))
    }

    pub fn model(&self) -> &str { &self.model }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    fn name(&self) -> &str { "ollama" }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(%url, model = %self.model, prompt_len = prompt.len(), "requesting completion");
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { model: &self.model, prompt, stream: false })
            .send()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("request to {} failed: {}", url, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::BackendUnavailable(format!("{} returned {}", url, status)));
        }
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("malformed response from {}: {}", url, e)))?;
        Ok(body.response)
    }
}
