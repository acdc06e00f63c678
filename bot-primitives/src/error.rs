//! Shared error definitions for bot primitives.

use thiserror::Error;

/// Result alias used throughout the bot runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided identifier was empty or contained whitespace.
    #[error("invalid {kind} id `{id}`: {reason}")]
    InvalidId {
        /// Which identifier family failed validation.
        kind: &'static str,
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}
