//! Content policy for the chatter bot.
//!
//! A single banned-word set drives two asymmetric checks: user input is
//! masked and still processed, while generated output containing a banned
//! term is rejected outright.

#![warn(missing_docs, clippy::pedantic)]

pub mod decision;
pub mod profanity;

pub use decision::{DecisionKind, PolicyDecision};
pub use profanity::{MASK, PolicyError, PolicyResult, ProfanityFilter};
