//! Policy decision types returned by the profanity gate.

use serde::{Deserialize, Serialize};

/// Describes the outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Text may be used as-is.
    Allow,
    /// Text must be discarded.
    Reject,
}

/// Structured decision emitted for a piece of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    kind: DecisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched: Option<String>,
}

impl PolicyDecision {
    /// Returns an allow decision.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            kind: DecisionKind::Allow,
            matched: None,
        }
    }

    /// Returns a reject decision naming the matched span.
    #[must_use]
    pub fn reject(matched: impl Into<String>) -> Self {
        Self {
            kind: DecisionKind::Reject,
            matched: Some(matched.into()),
        }
    }

    /// Returns the decision kind.
    #[must_use]
    pub fn kind(&self) -> DecisionKind {
        self.kind
    }

    /// Returns true when the text may be used.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.kind == DecisionKind::Allow
    }

    /// Returns true when the text must be discarded.
    #[must_use]
    pub fn is_reject(&self) -> bool {
        self.kind == DecisionKind::Reject
    }

    /// Returns the span that triggered a rejection.
    #[must_use]
    pub fn matched(&self) -> Option<&str> {
        self.matched.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_helpers_work() {
        let allow = PolicyDecision::allow();
        assert!(allow.is_allow());
        assert!(!allow.is_reject());
        assert_eq!(allow.matched(), None);

        let reject = PolicyDecision::reject("darn");
        assert!(reject.is_reject());
        assert_eq!(reject.kind(), DecisionKind::Reject);
        assert_eq!(reject.matched(), Some("darn"));
    }

    #[test]
    fn serializes_snake_case_kind() {
        let json = serde_json::to_string(&PolicyDecision::reject("x")).unwrap();
        assert_eq!(json, r#"{"kind":"reject","matched":"x"}"#);
    }
}
