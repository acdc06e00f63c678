//! Prompt orchestration for the chatter bot.
//!
//! Templates are plain strings carrying an `INPUT` placeholder for the user
//! message, any number of `NAME` placeholders, and `\n` escapes. The model is
//! expected to echo the rendered prompt and continue a quoted speaker turn;
//! [`extract`] recovers that quoted reply.

#![warn(missing_docs, clippy::pedantic)]

pub mod error;
pub mod extract;
pub mod names;
pub mod template;

pub use error::{PromptError, PromptResult};
pub use extract::{ExtractError, extract, extract_reply};
pub use names::{NameSource, RandomNames, substitute_names};
pub use template::{PromptSet, PromptTemplate};
