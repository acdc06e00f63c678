//! Durable record of every raw completion the bot receives.
//!
//! Records are plain text, each followed by a `---` separator line. Nothing
//! is ever pruned.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod journal;
pub mod volatile;

pub use error::{MemoryError, MemoryResult};
pub use journal::{AuditLog, FileAuditLog, RECORD_SEPARATOR};
pub use volatile::MemoryAuditLog;
