//! Deterministic in-process adapters for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;

use crate::traits::{
    AdapterMetadata, AdapterResult, AdapterStream, CompletionRequest, InferenceChunk,
    ModelAdapter,
};

/// Echoes the prompt followed by a fixed continuation.
#[derive(Debug)]
pub struct EchoAdapter {
    metadata: AdapterMetadata,
    continuation: String,
    calls: AtomicUsize,
}

impl EchoAdapter {
    /// Creates an adapter that appends `continuation` to every prompt.
    #[must_use]
    pub fn new(continuation: impl Into<String>) -> Self {
        Self {
            metadata: AdapterMetadata::new("echo", "echo"),
            continuation: continuation.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many completions have been requested.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelAdapter for EchoAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: CompletionRequest) -> AdapterResult<AdapterStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request.prompt().to_owned();
        let continuation = self.continuation.clone();
        let chunks = vec![
            Ok(InferenceChunk::new(prompt, false)),
            Ok(InferenceChunk::new(continuation, true)),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

type Script = dyn Fn(&str, usize) -> String + Send + Sync;

/// Produces output from a caller-supplied function of `(prompt, call index)`.
pub struct ScriptedAdapter {
    metadata: AdapterMetadata,
    script: Box<Script>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for ScriptedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedAdapter")
            .field("delay", &self.delay)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl ScriptedAdapter {
    /// Creates an adapter backed by `script`.
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, usize) -> String + Send + Sync + 'static,
    {
        Self {
            metadata: AdapterMetadata::new("scripted", "scripted"),
            script: Box::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleeps for `delay` before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many completions have been requested.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelAdapter for ScriptedAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: CompletionRequest) -> AdapterResult<AdapterStream> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let text = (self.script)(request.prompt(), index);
        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(text, true))
        })))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn echo_adapter_streams_prompt_then_continuation() {
        let adapter = EchoAdapter::new("Hello there!\"");
        let request = CompletionRequest::new("Bot: \"", 10).unwrap();

        let chunks: Vec<_> = adapter.infer(request).await.unwrap().collect().await;
        let text: String = chunks
            .into_iter()
            .map(|chunk| chunk.unwrap().delta)
            .collect();

        assert_eq!(text, "Bot: \"Hello there!\"");
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn scripted_adapter_sees_call_index() {
        let adapter = ScriptedAdapter::new(|prompt, index| format!("{prompt}{index}"));
        for expected in ["p0", "p1"] {
            let request = CompletionRequest::new("p", 10).unwrap();
            let mut stream = adapter.infer(request).await.unwrap();
            let chunk = stream.next().await.unwrap().unwrap();
            assert_eq!(chunk.delta, expected);
        }
        assert_eq!(adapter.calls(), 2);
    }
}
