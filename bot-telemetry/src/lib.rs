//! Observability utilities for the chatter bot.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support;

pub use tracing_support::{LogFormat, TelemetryError, init_tracing};
