use thiserror::Error;

/// Result alias for prompt operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors raised while building templates and prompt sets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    /// The template has no `INPUT` placeholder for the user message.
    #[error("template `{template}` has no INPUT placeholder")]
    MissingInput {
        /// The offending template, as configured.
        template: String,
    },

    /// The template does not end in the opening quote of the reply turn.
    #[error("template `{template}` must end with an opening quote")]
    MissingOpeningQuote {
        /// The offending template, as configured.
        template: String,
    },

    /// A prompt set was built without any templates.
    #[error("prompt set cannot be empty")]
    EmptyPromptSet,
}
