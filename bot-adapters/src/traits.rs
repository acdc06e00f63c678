//! Shared model adapter traits and data structures.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used by model adapters.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Streaming response emitted by [`ModelAdapter::infer`].
pub type AdapterStream = Pin<Box<dyn Stream<Item = AdapterResult<InferenceChunk>> + Send>>;

/// Error type shared by adapter implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Adapter is misconfigured or missing credentials.
    #[error("adapter not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The supplied request was invalid for the target model.
    #[error("invalid completion request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be processed.
        reason: String,
    },

    /// Transport-level failures (network, protocol, etc.).
    #[error("adapter transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The oracle did not answer within the configured deadline.
    #[error("completion timed out after {after:?}")]
    Timeout {
        /// Deadline that elapsed.
        after: Duration,
    },

    /// The provider returned a malformed response.
    #[error("adapter response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl AdapterError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing a model adapter instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterMetadata {
    provider: &'static str,
    model: String,
}

impl AdapterMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "ollama").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Raw text-completion request submitted to a model adapter.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CompletionRequest {
    prompt: String,
    max_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl CompletionRequest {
    /// Creates a request for a single continuation of `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidRequest`] if the prompt is empty or the
    /// length budget is zero.
    pub fn new(prompt: impl Into<String>, max_length: u32) -> AdapterResult<Self> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(AdapterError::invalid_request(
                "completion request requires a non-empty prompt",
            ));
        }
        if max_length == 0 {
            return Err(AdapterError::invalid_request(
                "completion request requires a positive max_length",
            ));
        }

        Ok(Self {
            prompt,
            max_length,
            temperature: None,
        })
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Returns the prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the generation budget.
    #[must_use]
    pub const fn max_length(&self) -> u32 {
        self.max_length
    }

    /// Returns the configured sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Number of candidate continuations requested. Always one.
    #[must_use]
    pub const fn num_return_sequences(&self) -> u32 {
        1
    }
}

/// Streaming chunk returned by the adapter.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct InferenceChunk {
    /// Partial text delta emitted by the provider.
    pub delta: String,
    /// Whether the generation is complete.
    pub done: bool,
}

impl InferenceChunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(delta: impl Into<String>, done: bool) -> Self {
        Self {
            delta: delta.into(),
            done,
        }
    }
}

/// Trait implemented by all model adapters.
///
/// The streamed text must start with the verbatim prompt; adapters for
/// backends that do not echo it prepend it themselves.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Returns basic metadata describing the adapter instance.
    fn metadata(&self) -> &AdapterMetadata;

    /// Executes the completion request, returning a streaming response.
    async fn infer(&self, request: CompletionRequest) -> AdapterResult<AdapterStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_request_prompt() {
        let err = CompletionRequest::new("", 100).expect_err("prompt required");
        assert!(matches!(err, AdapterError::InvalidRequest { .. }));

        let err = CompletionRequest::new("hi", 0).expect_err("budget required");
        assert!(matches!(err, AdapterError::InvalidRequest { .. }));
    }

    #[test]
    fn builds_request() {
        let request = CompletionRequest::new("Me: \"hi\"\nBot: \"", 100)
            .unwrap()
            .with_temperature(0.7);

        assert_eq!(request.max_length(), 100);
        assert_eq!(request.temperature(), Some(0.7));
        assert_eq!(request.num_return_sequences(), 1);
    }
}
