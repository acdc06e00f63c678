//! Prompt templates and the set they are drawn from.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{PromptError, PromptResult};

/// Placeholder replaced with the (censored) user message.
pub const INPUT_PLACEHOLDER: &str = "INPUT";

/// Template used when no prompt file is configured.
pub const DEFAULT_TEMPLATE: &str = r#"Me: "INPUT"\nBot: ""#;

/// A validated prompt template.
///
/// The raw form keeps `\n` escapes as configured; [`PromptTemplate::render`]
/// expands them before inserting the message, so escapes typed by users stay
/// literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    raw: String,
    expanded: String,
}

impl PromptTemplate {
    /// Validates and stores a template.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::MissingInput`] when `INPUT` is absent and
    /// [`PromptError::MissingOpeningQuote`] when the expanded template does not
    /// end with `"`.
    pub fn new(raw: impl Into<String>) -> PromptResult<Self> {
        let raw = raw.into();
        if !raw.contains(INPUT_PLACEHOLDER) {
            return Err(PromptError::MissingInput { template: raw });
        }

        let expanded = raw.replace("\\n", "\n");
        if !expanded.ends_with('"') {
            return Err(PromptError::MissingOpeningQuote { template: raw });
        }

        Ok(Self { raw, expanded })
    }

    /// Returns the template exactly as configured.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Expands escapes and substitutes every `INPUT` with `message`.
    ///
    /// `NAME` placeholders are left in place for [`crate::substitute_names`].
    #[must_use]
    pub fn render(&self, message: &str) -> String {
        self.expanded.replace(INPUT_PLACEHOLDER, message)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            raw: DEFAULT_TEMPLATE.to_owned(),
            expanded: DEFAULT_TEMPLATE.replace("\\n", "\n"),
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Non-empty, ordered collection of templates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptSet {
    templates: Vec<PromptTemplate>,
}

impl PromptSet {
    /// Builds a set from already validated templates.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::EmptyPromptSet`] when `templates` is empty.
    pub fn new(templates: Vec<PromptTemplate>) -> PromptResult<Self> {
        if templates.is_empty() {
            return Err(PromptError::EmptyPromptSet);
        }
        debug!(templates = templates.len(), "prompt set ready");
        Ok(Self { templates })
    }

    /// Parses and validates every raw template.
    ///
    /// # Errors
    ///
    /// Propagates the first template validation error, or
    /// [`PromptError::EmptyPromptSet`] when no templates are supplied.
    pub fn parse<I, S>(raw: I) -> PromptResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let templates = raw
            .into_iter()
            .map(PromptTemplate::new)
            .collect::<PromptResult<Vec<_>>>()?;
        Self::new(templates)
    }

    /// Set holding only `template`.
    #[must_use]
    pub fn single(template: PromptTemplate) -> Self {
        Self {
            templates: vec![template],
        }
    }

    /// Returns the templates in configured order.
    #[must_use]
    pub fn templates(&self) -> &[PromptTemplate] {
        &self.templates
    }

    /// Number of templates in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true when the set holds no templates. Constructed sets never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Picks a template uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &PromptTemplate {
        self.templates
            .choose(rng)
            .unwrap_or(&self.templates[0])
    }

    /// Picks a template and renders it for `message`.
    pub fn resolve<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> String {
        self.choose(rng).render(message)
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::single(PromptTemplate::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn renders_default_template() {
        let template = PromptTemplate::new(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(template.render("hi"), "Me: \"hi\"\nBot: \"");
        assert_eq!(template, PromptTemplate::default());
    }

    #[test]
    fn user_escapes_stay_literal() {
        let template = PromptTemplate::default();
        assert_eq!(template.render(r"a\nb"), "Me: \"a\\nb\"\nBot: \"");
    }

    #[test]
    fn rejects_template_without_input() {
        let err = PromptTemplate::new("Bot: \"").unwrap_err();
        assert!(matches!(err, PromptError::MissingInput { .. }));
    }

    #[test]
    fn rejects_template_without_trailing_quote() {
        let err = PromptTemplate::new("Me: INPUT\\nBot:").unwrap_err();
        assert!(matches!(err, PromptError::MissingOpeningQuote { .. }));

        let err = PromptTemplate::new(r#"Me: "INPUT"\nBot: "hi" said"#).unwrap_err();
        assert!(matches!(err, PromptError::MissingOpeningQuote { .. }));
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = PromptSet::parse(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, PromptError::EmptyPromptSet);
    }

    #[test]
    fn choose_covers_every_template() {
        let set = PromptSet::parse([
            r#"A: "INPUT"\nB: ""#,
            r#"C: "INPUT"\nD: ""#,
            r#"E: "INPUT"\nF: ""#,
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let seen: HashSet<_> = (0..200)
            .map(|_| set.choose(&mut rng).raw().to_owned())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn resolve_substitutes_every_input() {
        let set = PromptSet::parse([r#"INPUT? "INPUT"\nBot: ""#]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(set.resolve("yo", &mut rng), "yo? \"yo\"\nBot: \"");
    }
}
