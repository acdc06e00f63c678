//! Fixed-budget completion wrapper around a [`ModelAdapter`].

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::timeout;
use tracing::debug;

use crate::traits::{AdapterError, AdapterResult, CompletionRequest, ModelAdapter};

/// Generation budget applied to every completion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OracleSettings {
    /// Maximum output length handed to the provider.
    pub max_length: u32,
    /// Wall-clock limit for one completion, including stream collection.
    pub timeout: Duration,
    /// Optional sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            max_length: 100,
            timeout: Duration::from_secs(60),
            temperature: None,
        }
    }
}

/// Opaque text-completion oracle: prompt in, one continuation out.
#[derive(Clone)]
pub struct CompletionOracle {
    adapter: Arc<dyn ModelAdapter>,
    settings: OracleSettings,
}

impl std::fmt::Debug for CompletionOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionOracle")
            .field("provider", &self.adapter.metadata().provider())
            .field("model", &self.adapter.metadata().model())
            .field("settings", &self.settings)
            .finish()
    }
}

impl CompletionOracle {
    /// Wraps `adapter` with the supplied budget.
    #[must_use]
    pub fn new(adapter: Arc<dyn ModelAdapter>, settings: OracleSettings) -> Self {
        Self { adapter, settings }
    }

    /// Returns the active generation budget.
    #[must_use]
    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    /// Returns the wrapped adapter.
    #[must_use]
    pub fn adapter(&self) -> &Arc<dyn ModelAdapter> {
        &self.adapter
    }

    /// Requests one continuation of `prompt` and returns the full raw text.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Timeout`] when the deadline elapses, or any
    /// error raised by the adapter while starting or draining the stream.
    pub async fn complete(&self, prompt: &str) -> AdapterResult<String> {
        let mut request = CompletionRequest::new(prompt, self.settings.max_length)?;
        if let Some(temperature) = self.settings.temperature {
            request = request.with_temperature(temperature);
        }

        let deadline = self.settings.timeout;
        let text = timeout(deadline, self.collect(request))
            .await
            .map_err(|_| AdapterError::Timeout { after: deadline })??;

        debug!(
            provider = self.adapter.metadata().provider(),
            chars = text.len(),
            "completion collected"
        );
        Ok(text)
    }

    async fn collect(&self, request: CompletionRequest) -> AdapterResult<String> {
        let mut stream = self.adapter.infer(request).await?;
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            text.push_str(&chunk.delta);
            if chunk.done {
                break;
            }
        }
        Ok(text)
    }
}
