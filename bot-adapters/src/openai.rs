//! Adapter for OpenAI-compatible legacy completion endpoints.
//!
//! `/v1/completions` accepts `echo: true`, so the provider itself returns the
//! prompt followed by the continuation. Self-hosted servers (vLLM, llama.cpp,
//! text-generation-inference) expose the same route.

use std::{env, fmt, time::Duration};

use async_trait::async_trait;
use futures::stream;
use hyper::Uri;
use serde::{Deserialize, Serialize};

use crate::http_client::{HyperClient, build_https_client, post_json, sanitize_base_url};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, CompletionRequest,
    InferenceChunk, ModelAdapter,
};

/// Environment variable used when loading configuration automatically.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the completions adapter.
#[derive(Clone, Debug)]
pub struct OpenAiCompletionsConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl OpenAiCompletionsConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: "https://api.openai.com/".to_owned(),
            timeout: Duration::from_secs(60),
            default_temperature: None,
        }
    }

    /// Loads the API key from the `OPENAI_API_KEY` environment variable.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut cfg = Self::new(model);
        cfg.api_key = env::var(OPENAI_API_KEY_ENV).ok();
        cfg
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url("OpenAI", base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the default sampling temperature used when requests omit it.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Adapter calling `POST {base}/v1/completions` with prompt echo enabled.
pub struct OpenAiCompletionsAdapter {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    api_key: Option<String>,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OpenAiCompletionsAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompletionsAdapter")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompletionsAdapter {
    /// Constructs a new adapter with the provided configuration.
    ///
    /// A missing API key is accepted only for non-`api.openai.com` hosts,
    /// since self-hosted servers usually run unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API key is required but
    /// missing, or the endpoint is invalid.
    pub fn new(config: OpenAiCompletionsConfig) -> AdapterResult<Self> {
        if config.api_key.is_none() && config.base_url.contains("api.openai.com") {
            return Err(AdapterError::configuration(
                "OpenAI adapter requires an API key",
            ));
        }

        let metadata = AdapterMetadata::new("openai", config.model.clone());
        let endpoint = format!("{}v1/completions", config.base_url)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid OpenAI endpoint: {err}"))
            })?;

        let client = build_https_client()?;

        Ok(Self {
            client,
            endpoint,
            metadata,
            api_key: config.api_key,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> CompletionsRequest {
        CompletionsRequest {
            model: self.metadata.model().to_owned(),
            prompt: request.prompt().to_owned(),
            max_tokens: request.max_length(),
            temperature: request.temperature().or(self.default_temperature),
            n: request.num_return_sequences(),
            echo: true,
            stream: false,
        }
    }
}

#[async_trait]
impl ModelAdapter for OpenAiCompletionsAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: CompletionRequest) -> AdapterResult<AdapterStream> {
        let payload = self.build_request(&request);
        let bytes = post_json(
            &self.client,
            "OpenAI",
            &self.endpoint,
            self.api_key.as_deref(),
            &payload,
            self.timeout,
        )
        .await?;

        let response: CompletionsResponse =
            serde_json::from_slice(&bytes).map_err(|err| AdapterError::Response {
                reason: format!("failed to decode OpenAI response: {err}"),
            })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| AdapterError::Response {
                reason: "OpenAI response contained no choices".to_owned(),
            })?;

        let stream = stream::once(async move { Ok(InferenceChunk::new(text, true)) });
        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Serialize)]
struct CompletionsRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    n: u32,
    echo: bool,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_endpoint_requires_api_key() {
        let err = OpenAiCompletionsAdapter::new(OpenAiCompletionsConfig::new("gpt-3.5-turbo-instruct"))
            .expect_err("api key required");
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn self_hosted_endpoint_allows_missing_key() {
        let config = OpenAiCompletionsConfig::new("gpt2")
            .with_base_url("http://localhost:8000")
            .unwrap();
        let adapter = OpenAiCompletionsAdapter::new(config).expect("adapter");
        assert_eq!(adapter.endpoint.path(), "/v1/completions");
    }

    #[test]
    fn request_enables_echo_with_single_candidate() {
        let config = OpenAiCompletionsConfig::new("gpt2").with_api_key("sk-test");
        let adapter = OpenAiCompletionsAdapter::new(config).unwrap();
        let request = CompletionRequest::new("Me: \"hi\"\nBot: \"", 64).unwrap();

        let payload = adapter.build_request(&request);
        assert!(payload.echo);
        assert_eq!(payload.n, 1);
        assert_eq!(payload.max_tokens, 64);
    }

    #[test]
    fn parses_first_choice_text() {
        let json = r#"{"choices": [{"text": "Me: \"hi\"\nBot: \"yo\"", "index": 0}]}"#;
        let parsed: CompletionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].text, "Me: \"hi\"\nBot: \"yo\"");
    }
}
