//! Banned-word matching, input censoring, and output rejection.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::decision::PolicyDecision;

/// Marker substituted for banned spans in user input.
pub const MASK: &str = "****";

/// Length of the star run checked when validating patterns.
const MASK_RUN_LEN: usize = 64;

/// Censored text shapes a banned entry must never match.
fn censored_shapes() -> [String; 6] {
    [
        MASK.to_owned(),
        format!(" {MASK} "),
        format!("\"{MASK}\""),
        format!("a{MASK}a"),
        format!("{MASK} {MASK}"),
        "*".repeat(MASK_RUN_LEN),
    ]
}

/// Errors raised while building a [`ProfanityFilter`].
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A `/.../` entry is not a valid regular expression.
    #[error("invalid banned pattern `{entry}`: {source}")]
    InvalidPattern {
        /// The configured entry.
        entry: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// An entry matches the empty string and would reject everything.
    #[error("banned entry `{entry}` matches empty text")]
    MatchesEmpty {
        /// The configured entry.
        entry: String,
    },
    /// An entry matches the mask marker, so censored text would be rejected.
    #[error("banned entry `{entry}` matches the mask marker")]
    MaskCollision {
        /// The configured entry.
        entry: String,
    },
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Case-insensitive matcher over a banned-word set.
///
/// Plain entries match as literal substrings. Entries wrapped in slashes
/// (`/fu+dge/`) are regular expressions. Blank entries are skipped.
#[derive(Clone, Debug, Default)]
pub struct ProfanityFilter {
    matcher: Option<Regex>,
    entries: usize,
}

impl ProfanityFilter {
    /// Builds a filter from configured entries.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] for invalid patterns, patterns matching the
    /// empty string, and entries that would match censored text.
    pub fn new<I, S>(entries: I) -> PolicyResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let shapes = censored_shapes();
        let mut alternatives = Vec::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let pattern = entry_pattern(entry);
            let compiled = compile(&pattern).map_err(|source| PolicyError::InvalidPattern {
                entry: entry.to_owned(),
                source,
            })?;
            if compiled.is_match("") {
                return Err(PolicyError::MatchesEmpty {
                    entry: entry.to_owned(),
                });
            }
            if shapes.iter().any(|shape| compiled.is_match(shape)) {
                return Err(PolicyError::MaskCollision {
                    entry: entry.to_owned(),
                });
            }
            alternatives.push((entry.len(), pattern));
        }

        // Longer entries first so overlapping terms mask the widest span.
        alternatives.sort_by(|a, b| b.0.cmp(&a.0));
        let entries = alternatives.len();
        let matcher = if alternatives.is_empty() {
            None
        } else {
            let joined = alternatives
                .iter()
                .map(|(_, pattern)| format!("(?:{pattern})"))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&joined).map_err(|source| PolicyError::InvalidPattern {
                entry: joined.clone(),
                source,
            })?)
        };

        debug!(entries, "profanity filter ready");
        Ok(Self { matcher, entries })
    }

    /// Number of active banned entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Returns true when no entries are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Returns true when `text` contains any banned term.
    #[must_use]
    pub fn contains_profanity(&self, text: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(text))
    }

    /// Evaluates generated text, naming the first offending span.
    #[must_use]
    pub fn evaluate(&self, text: &str) -> PolicyDecision {
        match self.matcher.as_ref().and_then(|matcher| matcher.find(text)) {
            Some(found) => PolicyDecision::reject(found.as_str()),
            None => PolicyDecision::allow(),
        }
    }

    /// Masks every banned span in `text` with [`MASK`].
    ///
    /// Masking repeats until a pass changes nothing, so spans formed by
    /// earlier masks are caught too. Entries that match censored text are
    /// refused by [`Self::new`], which keeps the result clean.
    #[must_use]
    pub fn censor(&self, text: &str) -> String {
        let Some(matcher) = self.matcher.as_ref() else {
            return text.to_owned();
        };
        let mut out = text.to_owned();
        loop {
            let next = matcher.replace_all(&out, MASK);
            if next == out {
                break;
            }
            out = next.into_owned();
        }
        if matcher.is_match(&out) {
            warn!("censored text still matches a banned entry");
        }
        out
    }
}

fn entry_pattern(entry: &str) -> String {
    match entry
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
    {
        Some(pattern) if !pattern.is_empty() => pattern.to_owned(),
        _ => regex::escape(entry),
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ProfanityFilter {
        ProfanityFilter::new(["darn", "heck", "/fu+dge/", "  ", ""]).unwrap()
    }

    #[test]
    fn blank_entries_are_skipped() {
        assert_eq!(filter().len(), 3);
        assert!(ProfanityFilter::new(["", "\t"]).unwrap().is_empty());
    }

    #[test]
    fn empty_filter_allows_everything() {
        let filter = ProfanityFilter::default();
        assert!(!filter.contains_profanity("anything at all"));
        assert_eq!(filter.censor("anything"), "anything");
        assert!(filter.evaluate("anything").is_allow());
    }

    #[test]
    fn matches_case_insensitive_substrings() {
        let filter = filter();
        assert!(filter.contains_profanity("Oh DARN it"));
        assert!(filter.contains_profanity("what the heckin"));
        assert!(filter.contains_profanity("FUUUDGE"));
        assert!(!filter.contains_profanity("a clean sentence"));
    }

    #[test]
    fn evaluate_reports_matched_span() {
        let decision = filter().evaluate("well Heck.");
        assert!(decision.is_reject());
        assert_eq!(decision.matched(), Some("Heck"));
    }

    #[test]
    fn censor_is_identity_on_clean_text() {
        let text = "hello there, friend";
        assert_eq!(filter().censor(text), text);
    }

    #[test]
    fn censored_text_is_not_profane() {
        let filter = filter();
        let censored = filter.censor("darn it, what the Heck, fuuudge");
        assert_eq!(censored, "**** it, what the ****, ****");
        assert!(!filter.contains_profanity(&censored));
    }

    #[test]
    fn censor_rescans_spans_formed_by_masking() {
        let filter = ProfanityFilter::new(["ab", "/x\\*+y/"]).unwrap();
        let censored = filter.censor("xaby");
        assert!(!filter.contains_profanity(&censored));
    }

    #[test]
    fn longer_entries_mask_wider_span() {
        let filter = ProfanityFilter::new(["ass", "assorted-word"]).unwrap();
        assert_eq!(filter.censor("an assorted-word"), "an ****");
    }

    #[test]
    fn rejects_pattern_matching_empty_text() {
        let err = ProfanityFilter::new(["/a*/"]).unwrap_err();
        assert!(matches!(err, PolicyError::MatchesEmpty { .. }));
    }

    #[test]
    fn rejects_entry_matching_mask() {
        let err = ProfanityFilter::new(["**"]).unwrap_err();
        assert!(matches!(err, PolicyError::MaskCollision { .. }));
    }

    #[test]
    fn rejects_anchored_entry_matching_mask() {
        let err = ProfanityFilter::new(["darn", r"/^\*{4}$/"]).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MaskCollision { ref entry } if entry == r"/^\*{4}$/"
        ));
        assert!(ProfanityFilter::new([r"/\b\*{4}\b/"]).is_err());
    }

    #[test]
    fn censor_stops_when_masking_changes_nothing() {
        let filter = ProfanityFilter {
            matcher: Some(compile(r"^(?:darn|\*{4})$").unwrap()),
            entries: 2,
        };
        assert_eq!(filter.censor("darn"), MASK);
        assert_eq!(filter.censor(MASK), MASK);
    }

    #[test]
    fn rejects_invalid_pattern() {
        let err = ProfanityFilter::new(["/(unclosed/"]).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { .. }));
    }
}
