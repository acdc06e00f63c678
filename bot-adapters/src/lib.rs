//! Text-completion adapters used by the bot.
//!
//! Each provider module implements the [`traits::ModelAdapter`] interface; the
//! [`oracle::CompletionOracle`] wraps any adapter with the generation budget
//! and timeout the pipeline relies on.

#![warn(missing_docs, clippy::pedantic)]

pub mod ollama;
pub mod openai;
pub mod oracle;
pub mod stub;
pub mod traits;

mod http_client;

pub use oracle::{CompletionOracle, OracleSettings};
pub use traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, CompletionRequest,
    InferenceChunk, ModelAdapter,
};
