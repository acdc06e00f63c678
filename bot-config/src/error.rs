use std::path::PathBuf;

use bot_policy::PolicyError;
use bot_prompts::PromptError;
use thiserror::Error;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration. All of them are fatal at
/// startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Source [`std::io::Error`].
        #[source]
        source: std::io::Error,
    },

    /// A required single-value file was empty.
    #[error("{path} is empty")]
    Empty {
        /// Offending file.
        path: PathBuf,
    },

    /// A channel or owner identifier failed validation.
    #[error("invalid identifier in {path}: {source}")]
    InvalidId {
        /// Offending file.
        path: PathBuf,
        /// Validation error.
        #[source]
        source: bot_primitives::Error,
    },

    /// `settings.toml` could not be parsed.
    #[error("invalid settings in {path}: {source}")]
    Settings {
        /// Offending file.
        path: PathBuf,
        /// TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A setting holds an out-of-range value.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting {
        /// Setting name.
        key: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A prompt template failed validation, or none were configured.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// The banned-word list could not be compiled.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
