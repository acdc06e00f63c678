//! Core shared types for the chatter bot.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod message;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Chat platform identifiers.
pub use ids::{ChannelId, UserId};
/// Inbound and outbound message envelopes.
pub use message::{InboundMessage, OutboundReply};
