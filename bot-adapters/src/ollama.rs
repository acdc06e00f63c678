//! `Ollama` adapter implementation.
//!
//! Uses the raw `/api/generate` endpoint so the prompt template reaches the
//! model untouched by any chat formatting. Ollama returns only the
//! continuation; the adapter prepends the prompt so callers see the same
//! prompt-prefixed text a local text-generation pipeline produces.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use futures::stream;
use hyper::Uri;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::http_client::{HyperClient, build_https_client, post_json, sanitize_base_url};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, CompletionRequest,
    InferenceChunk, ModelAdapter,
};

/// Configuration for the `Ollama` adapter.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    timeout: Duration,
}

impl OllamaConfig {
    /// Creates a configuration for the supplied model using default settings.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: "http://127.0.0.1:11434/".to_owned(),
            model: model.into(),
            default_temperature: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the base URL of the local Ollama daemon.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url("Ollama", base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the default sampling temperature used when the request does not
    /// provide one explicitly.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP timeout for requests to the Ollama daemon.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `Ollama` adapter that calls the local Ollama daemon over HTTP/HTTPS.
pub struct OllamaAdapter {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OllamaAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaAdapter")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OllamaAdapter {
    /// Constructs a new adapter from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the endpoint is invalid or the HTTP
    /// client cannot be constructed.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: OllamaConfig) -> AdapterResult<Self> {
        let endpoint = format!("{}api/generate", config.base_url)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid Ollama endpoint: {err}"))
            })?;

        let client = build_https_client()?;
        let metadata = AdapterMetadata::new("ollama", config.model.clone());

        Ok(Self {
            client,
            endpoint,
            metadata,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> GenerateRequest {
        GenerateRequest {
            model: self.metadata.model().to_owned(),
            prompt: request.prompt().to_owned(),
            raw: true,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature().or(self.default_temperature),
                num_predict: request.max_length(),
            },
        }
    }
}

#[async_trait]
impl ModelAdapter for OllamaAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: CompletionRequest) -> AdapterResult<AdapterStream> {
        let payload = self.build_request(&request);
        let bytes = post_json(
            &self.client,
            "Ollama",
            &self.endpoint,
            None,
            &payload,
            self.timeout,
        )
        .await?;

        let response: GenerateResponse =
            serde_json::from_slice(&bytes).map_err(|err| AdapterError::Response {
                reason: format!("failed to decode Ollama response: {err}"),
            })?;

        if let Some(error) = response.error {
            return Err(AdapterError::Response { reason: error });
        }

        trace!(model = self.metadata.model(), done = response.done, "ollama completion received");
        let text = echo_prompt(request.prompt(), &response.response);
        let stream = stream::once(async move { Ok(InferenceChunk::new(text, true)) });
        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    raw: bool,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

fn echo_prompt(prompt: &str, continuation: &str) -> String {
    let mut text = String::with_capacity(prompt.len() + continuation.len());
    text.push_str(prompt);
    text.push_str(continuation);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_base_url_without_scheme() {
        let err = OllamaConfig::new("gpt2")
            .with_base_url("localhost:11434")
            .expect_err("missing scheme should error");
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn generate_response_parsing_tolerates_missing_fields() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"response": "hi\""}"#).unwrap();
        assert_eq!(parsed.response, "hi\"");
        assert!(!parsed.done);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn build_request_uses_raw_mode_and_budget() {
        let config = OllamaConfig::new("gpt2").with_default_temperature(0.9);
        let adapter = OllamaAdapter::new(config).expect("adapter");
        let request = CompletionRequest::new("Me: \"hi\"\nBot: \"", 100).unwrap();

        let payload = adapter.build_request(&request);
        assert!(payload.raw);
        assert!(!payload.stream);
        assert_eq!(payload.options.num_predict, 100);
        assert_eq!(payload.options.temperature, Some(0.9));
    }

    #[test]
    fn continuation_is_prefixed_with_prompt() {
        assert_eq!(echo_prompt("Bot: \"", "Hey\""), "Bot: \"Hey\"");
    }
}
