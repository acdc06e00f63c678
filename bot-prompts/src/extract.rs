//! Recovers the quoted reply from a prompt-prefixed completion.

use thiserror::Error;

/// Why a completion yielded no usable reply.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The completion does not start with the prompt it was generated from.
    #[error("completion does not echo the prompt")]
    PromptMismatch,
    /// Nothing was generated before the closing quote.
    #[error("completion produced an empty reply")]
    Empty,
}

/// Returns the text generated after `prompt`, up to the first `"`.
///
/// When no closing quote follows, the whole continuation is kept.
///
/// # Errors
///
/// Returns [`ExtractError::PromptMismatch`] when `raw` is not prefixed by
/// `prompt`, and [`ExtractError::Empty`] when the reply is empty.
pub fn extract_reply<'a>(raw: &'a str, prompt: &str) -> Result<&'a str, ExtractError> {
    let continuation = raw
        .strip_prefix(prompt)
        .ok_or(ExtractError::PromptMismatch)?;
    let reply = continuation
        .find('"')
        .map_or(continuation, |end| &continuation[..end]);

    if reply.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(reply)
}

/// Like [`extract_reply`], collapsing every failure to an empty string.
#[must_use]
pub fn extract<'a>(raw: &'a str, prompt: &str) -> &'a str {
    extract_reply(raw, prompt).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "Me: \"hi\"\nBot: \"";

    #[test]
    fn takes_text_up_to_closing_quote() {
        let raw = format!("{PROMPT}reply text\"tail");
        assert_eq!(extract(&raw, PROMPT), "reply text");
    }

    #[test]
    fn bare_echo_is_empty() {
        assert_eq!(extract(PROMPT, PROMPT), "");
        assert_eq!(extract_reply(PROMPT, PROMPT), Err(ExtractError::Empty));
    }

    #[test]
    fn immediate_quote_is_empty() {
        let raw = format!("{PROMPT}\"\nMe: \"");
        assert_eq!(extract_reply(&raw, PROMPT), Err(ExtractError::Empty));
    }

    #[test]
    fn unterminated_reply_keeps_remainder() {
        let raw = format!("{PROMPT}still talking");
        assert_eq!(extract(&raw, PROMPT), "still talking");
    }

    #[test]
    fn missing_prompt_echo_is_rejected() {
        assert_eq!(
            extract_reply("Hello there!\"", PROMPT),
            Err(ExtractError::PromptMismatch)
        );
        assert_eq!(extract("Hello there!\"", PROMPT), "");
    }

    #[test]
    fn multibyte_continuation_is_sliced_safely() {
        let raw = format!("{PROMPT}héllo ✓\" after");
        assert_eq!(extract(&raw, PROMPT), "héllo ✓");
    }
}
