//! Configuration management for the chatter bot.
//!
//! Configuration lives in a directory of flat files, loaded once at startup
//! into an immutable [`BotConfig`] that is passed to the runtime.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{BotConfig, GenerationSettings, OracleProvider, OracleSection, Settings};
