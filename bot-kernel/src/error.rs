use thiserror::Error;

/// Result alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Errors surfaced by the dispatcher. Generation itself never fails; it
/// degrades to the exhaustion sentinel.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Delivering a reply to the chat platform failed.
    #[error("failed to deliver reply: {reason}")]
    Delivery {
        /// Platform-specific failure description.
        reason: String,
    },

    /// A command referenced a malformed channel identifier.
    #[error(transparent)]
    InvalidId(#[from] bot_primitives::Error),
}

impl KernelError {
    /// Convenience constructor for delivery failures.
    #[must_use]
    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::Delivery {
            reason: reason.into(),
        }
    }
}
