//! Generation pipeline and command dispatch for the chatter bot.
//!
//! [`ResponsePipeline`] turns one user message into one reply: it censors the
//! input, renders a random template, asks the completion oracle, records the
//! raw output, and retries on profane or empty results up to a fixed bound.
//! [`Dispatcher`] sits between a chat platform and the pipeline, enforcing the
//! channel allow-list and owner-only commands.

#![warn(missing_docs, clippy::pedantic)]

mod dispatch;
mod error;
mod pipeline;

pub use dispatch::{CollectingSink, Command, Dispatcher, ReplySink};
pub use error::{KernelError, KernelResult};
pub use pipeline::{
    EXHAUSTED_SENTINEL, Rejection, ResponseOutcome, ResponsePipeline, ResponsePipelineBuilder,
};
