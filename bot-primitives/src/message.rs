//! Message envelopes exchanged with the chat platform.

use serde::{Deserialize, Serialize};

use crate::{ChannelId, UserId};

/// A message delivered by the chat platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    channel_id: ChannelId,
    author_id: UserId,
    text: String,
}

impl InboundMessage {
    /// Creates a new inbound message.
    #[must_use]
    pub fn new(channel_id: ChannelId, author_id: UserId, text: impl Into<String>) -> Self {
        Self {
            channel_id,
            author_id,
            text: text.into(),
        }
    }

    /// Returns the channel the message was posted in.
    #[must_use]
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the author of the message.
    #[must_use]
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the raw message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A reply the bot wants delivered to a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    channel_id: ChannelId,
    text: String,
}

impl OutboundReply {
    /// Creates a reply targeting the supplied channel.
    #[must_use]
    pub fn new(channel_id: ChannelId, text: impl Into<String>) -> Self {
        Self {
            channel_id,
            text: text.into(),
        }
    }

    /// Returns the destination channel.
    #[must_use]
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the reply text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}
