//! Structured tracing helpers.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Output layout for log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field human readable lines.
    #[default]
    Full,
    /// Single-line compact output.
    Compact,
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// `RUST_LOG` or the fallback directive could not be parsed.
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter {
        /// Directive that failed to parse.
        directive: String,
        /// Parser message.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialised: {reason}")]
    AlreadyInitialised {
        /// Underlying error message.
        reason: String,
    },
}

/// Builds the filter from `RUST_LOG`, falling back to `default_directive`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the fallback directive is
/// malformed.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive).map_err(|err| {
            TelemetryError::InvalidFilter {
                directive: default_directive.to_owned(),
                reason: err.to_string(),
            }
        }),
    }
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(default_directive: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = env_filter(default_directive)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|err| TelemetryError::AlreadyInitialised {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_directive_is_validated() {
        // RUST_LOG may be set in CI, in which case the fallback is unused.
        if std::env::var_os("RUST_LOG").is_none() {
            let err = env_filter("chatter=loudest").expect_err("malformed directive");
            assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
        }
        assert!(EnvFilter::try_new("info,bot_kernel=debug").is_ok());
    }

    #[test]
    fn second_init_reports_error() {
        let _ = init_tracing("warn", LogFormat::Compact);
        let err = init_tracing("warn", LogFormat::Full).expect_err("already set");
        assert!(matches!(err, TelemetryError::AlreadyInitialised { .. }));
    }
}
