//! Chatter bot facade.
//!
//! Depend on this crate via `cargo add chatter`. It bundles the bot crates
//! behind feature flags so embedders can pull in only the pieces they need,
//! for example the profanity filter without the HTTP adapters.

#![warn(missing_docs, clippy::pedantic)]

/// Shared identifiers and message types.
pub use bot_primitives as primitives;

/// Response pipeline and command dispatch (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use bot_kernel as kernel;

/// Completion backends (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use bot_adapters as adapters;

/// Audit logs (enabled by `memory` feature).
#[cfg(feature = "memory")]
pub use bot_memory as memory;

/// Banned-word filtering (enabled by `policy` feature).
#[cfg(feature = "policy")]
pub use bot_policy as policy;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use bot_telemetry as telemetry;

/// Prompt templates, name substitution and reply extraction (enabled by
/// `prompts` feature).
#[cfg(feature = "prompts")]
pub use bot_prompts as prompts;

/// Configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use bot_config as config;
