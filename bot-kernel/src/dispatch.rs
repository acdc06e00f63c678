//! Platform-agnostic command dispatch.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use bot_config::BotConfig;
use bot_primitives::{ChannelId, InboundMessage, OutboundReply, UserId};
use bot_prompts::{PromptSet, PromptTemplate};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::error::KernelResult;
use crate::pipeline::ResponsePipeline;

/// Reply sent after a successful `change_context`.
const CONTEXT_CHANGED: &str = "Context string changed";

/// Delivers replies to the chat platform.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Sends one reply.
    async fn send(&self, reply: OutboundReply) -> KernelResult<()>;
}

/// Sink that stores replies in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    replies: Mutex<Vec<OutboundReply>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the collected replies.
    pub async fn drain(&self) -> Vec<OutboundReply> {
        std::mem::take(&mut *self.replies.lock().await)
    }
}

#[async_trait]
impl ReplySink for CollectingSink {
    async fn send(&self, reply: OutboundReply) -> KernelResult<()> {
        self.replies.lock().await.push(reply);
        Ok(())
    }
}

/// A parsed chat command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate a reply to the given text.
    GenerateResponse(String),
    /// Owner only: replace the active prompt set with one template.
    ChangeContext(String),
    /// Owner only: post text to another channel.
    Say {
        /// Destination channel, unvalidated.
        channel: String,
        /// Text to post.
        text: String,
    },
    /// Prefixed text naming no known command.
    Unknown(String),
}

impl Command {
    /// Parses `text` as a command. Returns `None` for text without `prefix`.
    #[must_use]
    pub fn parse(prefix: &str, text: &str) -> Option<Self> {
        let body = text.trim_start().strip_prefix(prefix)?;
        let (name, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(name, rest)| (name, rest.trim()));

        Some(match name {
            "generate_response" => Self::GenerateResponse(rest.to_owned()),
            "change_context" => Self::ChangeContext(rest.to_owned()),
            "say" => {
                let (channel, text) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(channel, text)| (channel, text.trim()));
                Self::Say {
                    channel: channel.to_owned(),
                    text: text.to_owned(),
                }
            }
            other => Self::Unknown(other.to_owned()),
        })
    }
}

/// Routes inbound messages to the pipeline and owner commands.
#[derive(Debug)]
pub struct Dispatcher {
    pipeline: Arc<ResponsePipeline>,
    channels: BTreeSet<ChannelId>,
    owner: UserId,
    prefix: String,
    bot_user: Option<UserId>,
}

impl Dispatcher {
    /// Creates a dispatcher for the supplied allow-list and owner.
    #[must_use]
    pub fn new(
        pipeline: Arc<ResponsePipeline>,
        channels: impl IntoIterator<Item = ChannelId>,
        owner: UserId,
    ) -> Self {
        Self {
            pipeline,
            channels: channels.into_iter().collect(),
            owner,
            prefix: "!".to_owned(),
            bot_user: None,
        }
    }

    /// Creates a dispatcher from loaded configuration.
    #[must_use]
    pub fn from_config(config: &BotConfig, pipeline: Arc<ResponsePipeline>) -> Self {
        Self::new(pipeline, config.channels().iter().cloned(), config.owner().clone())
            .with_prefix(config.settings().command_prefix.clone())
    }

    /// Overrides the command prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the bot's own user id so its messages are never answered.
    #[must_use]
    pub fn with_bot_user(mut self, bot_user: UserId) -> Self {
        self.bot_user = Some(bot_user);
        self
    }

    /// Returns the wrapped pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<ResponsePipeline> {
        &self.pipeline
    }

    fn is_owner(&self, author: &UserId) -> bool {
        *author == self.owner
    }

    fn is_allowed(&self, channel: &ChannelId) -> bool {
        self.channels.contains(channel)
    }

    /// Handles one message, returning the reply to send, if any.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KernelError::InvalidId`] when an owner `say` command names a
    /// malformed channel.
    pub async fn handle(&self, message: &InboundMessage) -> KernelResult<Option<OutboundReply>> {
        if self.bot_user.as_ref() == Some(message.author_id()) {
            return Ok(None);
        }

        let channel = message.channel_id();
        let author = message.author_id();
        let command = Command::parse(&self.prefix, message.text())
            .unwrap_or_else(|| Command::GenerateResponse(message.text().trim().to_owned()));

        match command {
            Command::GenerateResponse(text) => {
                if !self.is_allowed(channel) {
                    debug!(%channel, "ignoring message outside allow-listed channels");
                    return Ok(None);
                }
                if text.is_empty() {
                    return Ok(None);
                }
                let reply = self.pipeline.generate(&text).await;
                Ok(Some(OutboundReply::new(channel.clone(), reply)))
            }
            Command::ChangeContext(raw) => {
                if !self.is_owner(author) {
                    warn!(%author, "non-owner attempted change_context");
                    return Ok(None);
                }
                let reply = match PromptTemplate::new(raw) {
                    Ok(template) => {
                        self.pipeline.replace_prompts(PromptSet::single(template));
                        CONTEXT_CHANGED.to_owned()
                    }
                    Err(err) => format!("Context string rejected: {err}"),
                };
                Ok(Some(OutboundReply::new(channel.clone(), reply)))
            }
            Command::Say { channel: target, text } => {
                if !self.is_owner(author) {
                    warn!(%author, "non-owner attempted say");
                    return Ok(None);
                }
                let target = ChannelId::new(target)?;
                if text.is_empty() {
                    return Ok(None);
                }
                info!(%target, "relaying owner message");
                Ok(Some(OutboundReply::new(target, text)))
            }
            Command::Unknown(name) => {
                debug!(command = %name, "unknown command");
                Ok(None)
            }
        }
    }

    /// Handles messages from `inbox` one at a time until the sender closes,
    /// delivering replies through `sink`. Failures are logged, never fatal.
    pub async fn serve(&self, mut inbox: mpsc::Receiver<InboundMessage>, sink: &dyn ReplySink) {
        while let Some(message) = inbox.recv().await {
            match self.handle(&message).await {
                Ok(Some(reply)) => {
                    if let Err(err) = sink.send(reply).await {
                        warn!(error = %err, "reply delivery failed");
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "message handling failed"),
            }
        }
        debug!("inbox closed; dispatcher stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            Command::parse("!", "!generate_response  hello there "),
            Some(Command::GenerateResponse("hello there".to_owned()))
        );
        assert_eq!(
            Command::parse("!", "!change_context Q: INPUT\\nA: \""),
            Some(Command::ChangeContext("Q: INPUT\\nA: \"".to_owned()))
        );
        assert_eq!(
            Command::parse("!", "!say 42 hi all"),
            Some(Command::Say {
                channel: "42".to_owned(),
                text: "hi all".to_owned()
            })
        );
        assert_eq!(
            Command::parse("!", "!dance"),
            Some(Command::Unknown("dance".to_owned()))
        );
        assert_eq!(Command::parse("!", "plain text"), None);
    }

    #[test]
    fn bare_command_has_empty_argument() {
        assert_eq!(
            Command::parse("?", "?generate_response"),
            Some(Command::GenerateResponse(String::new()))
        );
    }
}
