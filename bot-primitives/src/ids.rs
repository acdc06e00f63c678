//! Chat platform identifier types.
//!
//! Platforms hand out snowflakes, UUIDs, or opaque strings, so identifiers are
//! stored as validated strings and compared verbatim.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

fn validate(kind: &'static str, raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidId {
            kind,
            id: raw.to_owned(),
            reason: "identifier cannot be empty",
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(Error::InvalidId {
            kind,
            id: raw.to_owned(),
            reason: "identifier cannot contain whitespace",
        });
    }
    Ok(trimmed.to_owned())
}

/// Identifier of a channel (or thread) messages arrive in.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] when the value is empty or contains
    /// interior whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, Error> {
        validate("channel", raw.as_ref()).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a message author.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] when the value is empty or contains
    /// interior whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, Error> {
        validate("user", raw.as_ref()).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_parses_channel_id() {
        let id: ChannelId = " 1029384756 \n".parse().expect("parse");
        assert_eq!(id.as_str(), "1029384756");
        assert_eq!(id.to_string(), "1029384756");
    }

    #[test]
    fn rejects_empty_and_spaced_ids() {
        assert!(matches!(
            UserId::new("   "),
            Err(Error::InvalidId { kind: "user", .. })
        ));
        assert!(ChannelId::new("12 34").is_err());
    }

    #[test]
    fn serializes_transparently() {
        let id = UserId::new("42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }
}
