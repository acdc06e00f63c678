//! Bounded retry loop around template rendering, completion, and review.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bot_adapters::{AdapterError, CompletionOracle};
use bot_config::BotConfig;
use bot_memory::AuditLog;
use bot_policy::ProfanityFilter;
use bot_prompts::{ExtractError, PromptSet, RandomNames, extract_reply, substitute_names};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Reply returned when every attempt was rejected.
pub const EXHAUSTED_SENTINEL: &str = "Error: could not generate a proper response!";

/// Retries after the first attempt unless configured otherwise.
const DEFAULT_MAX_RETRIES: u32 = 10;

/// Why a single attempt was discarded.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The oracle failed or timed out; there is no raw output to record.
    #[error("completion failed: {0}")]
    Oracle(#[from] AdapterError),
    /// The raw output contains a banned term.
    #[error("output matched banned term `{matched}`")]
    Profane {
        /// Offending span.
        matched: String,
    },
    /// No reply could be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

/// Final state of one generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// An attempt produced a clean, non-empty reply.
    Accepted {
        /// The reply text.
        text: String,
        /// Attempts made, including the accepted one.
        attempts: u32,
    },
    /// Every attempt was rejected.
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
}

impl ResponseOutcome {
    /// Number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Accepted { attempts, .. } | Self::Exhausted { attempts } => *attempts,
        }
    }

    /// Returns true when a reply was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Text to send back: the reply, or [`EXHAUSTED_SENTINEL`].
    #[must_use]
    pub fn into_reply(self) -> String {
        match self {
            Self::Accepted { text, .. } => text,
            Self::Exhausted { .. } => EXHAUSTED_SENTINEL.to_owned(),
        }
    }
}

/// Turns user messages into sanitized model replies.
pub struct ResponsePipeline {
    prompts: RwLock<Arc<PromptSet>>,
    profanity: ProfanityFilter,
    oracle: CompletionOracle,
    audit: Arc<dyn AuditLog>,
    rng: Mutex<StdRng>,
    max_retries: u32,
}

impl std::fmt::Debug for ResponsePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsePipeline")
            .field("prompts", &self.prompts().len())
            .field("banned_entries", &self.profanity.len())
            .field("oracle", &self.oracle)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl ResponsePipeline {
    /// Returns a builder wired to `oracle` and `audit`.
    #[must_use]
    pub fn builder(oracle: CompletionOracle, audit: Arc<dyn AuditLog>) -> ResponsePipelineBuilder {
        ResponsePipelineBuilder::new(oracle, audit)
    }

    /// Builds a pipeline from loaded configuration.
    #[must_use]
    pub fn from_config(
        config: &BotConfig,
        oracle: CompletionOracle,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let generation = config.generation();
        let mut builder = Self::builder(oracle, audit)
            .prompts(config.prompts().clone())
            .profanity(config.profanity().clone())
            .max_retries(generation.max_retries);
        if let Some(seed) = generation.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }

    /// Snapshot of the active prompt set.
    #[must_use]
    pub fn prompts(&self) -> Arc<PromptSet> {
        Arc::clone(&self.prompts.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Atomically replaces the active prompt set. In-flight generations keep
    /// the set they started with.
    pub fn replace_prompts(&self, prompts: PromptSet) {
        let mut guard = self.prompts.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(prompts);
        info!(templates = guard.len(), "prompt set replaced");
    }

    /// Maximum number of retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Generates a reply for `message`, or the exhaustion sentinel.
    pub async fn generate(&self, message: &str) -> String {
        self.generate_outcome(message).await.into_reply()
    }

    /// Generates a reply and reports how many attempts it took.
    pub async fn generate_outcome(&self, message: &str) -> ResponseOutcome {
        let censored = self.profanity.censor(message);
        let prompts = self.prompts();

        for attempt in 0..=self.max_retries {
            let prompt = self.render(&prompts, &censored);
            match self.attempt(&prompt).await {
                Ok(text) => {
                    info!(attempt, chars = text.len(), "reply accepted");
                    return ResponseOutcome::Accepted {
                        text,
                        attempts: attempt + 1,
                    };
                }
                Err(Rejection::Oracle(err)) => warn!(attempt, error = %err, "attempt failed"),
                Err(rejection) => debug!(attempt, reason = %rejection, "attempt rejected"),
            }
        }

        let attempts = self.max_retries + 1;
        warn!(attempts, "no acceptable reply; returning sentinel");
        ResponseOutcome::Exhausted { attempts }
    }

    fn render(&self, prompts: &PromptSet, message: &str) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let resolved = prompts.resolve(message, &mut *rng);
        substitute_names(&resolved, &mut RandomNames::new(&mut *rng))
    }

    async fn attempt(&self, prompt: &str) -> Result<String, Rejection> {
        let raw = self.oracle.complete(prompt).await?;

        if let Err(err) = self.audit.append(&raw).await {
            error!(error = %err, "failed to append audit record");
        }

        let decision = self.profanity.evaluate(&raw);
        if decision.is_reject() {
            return Err(Rejection::Profane {
                matched: decision.matched().unwrap_or_default().to_owned(),
            });
        }

        let reply = extract_reply(&raw, prompt)?;
        Ok(reply.to_owned())
    }
}

/// Builder for [`ResponsePipeline`].
pub struct ResponsePipelineBuilder {
    oracle: CompletionOracle,
    audit: Arc<dyn AuditLog>,
    prompts: PromptSet,
    profanity: ProfanityFilter,
    max_retries: u32,
    seed: Option<u64>,
}

impl ResponsePipelineBuilder {
    fn new(oracle: CompletionOracle, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            oracle,
            audit,
            prompts: PromptSet::default(),
            profanity: ProfanityFilter::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            seed: None,
        }
    }

    /// Sets the prompt templates.
    #[must_use]
    pub fn prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sets the banned-word filter.
    #[must_use]
    pub fn profanity(mut self, profanity: ProfanityFilter) -> Self {
        self.profanity = profanity;
        self
    }

    /// Sets how many times a rejected attempt is retried.
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Seeds template and name draws. Unseeded pipelines draw from OS entropy.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Finalises construction.
    #[must_use]
    pub fn build(self) -> ResponsePipeline {
        let rng = self
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        ResponsePipeline {
            prompts: RwLock::new(Arc::new(self.prompts)),
            profanity: self.profanity,
            oracle: self.oracle,
            audit: self.audit,
            rng: Mutex::new(rng),
            max_retries: self.max_retries,
        }
    }
}
