//! Strongly typed configuration schemas.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bot_policy::ProfanityFilter;
use bot_primitives::{ChannelId, UserId};
use bot_prompts::PromptSet;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

fn default_max_length() -> u32 {
    100
}

fn default_max_retries() -> u32 {
    10
}

fn default_oracle_timeout_secs() -> u64 {
    60
}

fn default_audit_log() -> PathBuf {
    PathBuf::from("responses.txt")
}

fn default_command_prefix() -> String {
    "!".to_owned()
}

fn default_model() -> String {
    "gpt2".to_owned()
}

/// Which completion backend to talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    /// Local Ollama daemon.
    #[default]
    Ollama,
    /// OpenAI-compatible `/v1/completions` endpoint.
    Openai,
    /// In-process stub that echoes the prompt; useful offline.
    Echo,
}

/// `[oracle]` table of `settings.toml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleSection {
    /// Backend to use.
    #[serde(default)]
    pub provider: OracleProvider,
    /// Model name passed to the backend.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key for hosted endpoints.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            provider: OracleProvider::default(),
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: None,
        }
    }
}

/// Contents of the optional `settings.toml`.
///
/// | Key | Default | Description |
/// |-----|---------|-------------|
/// | `max_length` | 100 | Generation budget per completion. |
/// | `max_retries` | 10 | Retries after the first attempt before giving up. |
/// | `oracle_timeout_secs` | 60 | Wall-clock limit per completion. |
/// | `seed` | none | Seed for template and name draws. |
/// | `audit_log` | `responses.txt` | Audit log path, relative to the config directory. |
/// | `command_prefix` | `!` | Prefix for chat commands. |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Generation budget per completion.
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Wall-clock limit per completion, in seconds.
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
    /// Seed for the process random generator.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Audit log location.
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,
    /// Prefix that marks chat commands.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Oracle backend selection.
    #[serde(default)]
    pub oracle: OracleSection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            max_retries: default_max_retries(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            seed: None,
            audit_log: default_audit_log(),
            command_prefix: default_command_prefix(),
            oracle: OracleSection::default(),
        }
    }
}

impl Settings {
    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for zero budgets or an empty
    /// command prefix.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_length == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "max_length",
                reason: "must be positive",
            });
        }
        if self.oracle_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "oracle_timeout_secs",
                reason: "must be positive",
            });
        }
        if self.command_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "command_prefix",
                reason: "cannot be empty",
            });
        }
        Ok(())
    }
}

/// Generation parameters handed to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Generation budget per completion.
    pub max_length: u32,
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Wall-clock limit per completion.
    pub oracle_timeout: Duration,
    /// Seed for template and name draws.
    pub seed: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Settings::default().generation()
    }
}

impl Settings {
    /// Extracts the generation parameters.
    #[must_use]
    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            max_length: self.max_length,
            max_retries: self.max_retries,
            oracle_timeout: Duration::from_secs(self.oracle_timeout_secs),
            seed: self.seed,
        }
    }
}

/// Immutable, fully validated bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    pub(crate) token: Option<String>,
    pub(crate) channels: BTreeSet<ChannelId>,
    pub(crate) owner: UserId,
    pub(crate) prompts: PromptSet,
    pub(crate) profanity: ProfanityFilter,
    pub(crate) settings: Settings,
    pub(crate) audit_log_path: PathBuf,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("channels", &self.channels)
            .field("owner", &self.owner)
            .field("prompts", &self.prompts.len())
            .field("banned_entries", &self.profanity.len())
            .field("settings", &self.settings)
            .field("audit_log_path", &self.audit_log_path)
            .finish()
    }
}

impl BotConfig {
    /// Builds a configuration directly, mainly for tests and embedding.
    #[must_use]
    pub fn new(
        channels: impl IntoIterator<Item = ChannelId>,
        owner: UserId,
        prompts: PromptSet,
        profanity: ProfanityFilter,
    ) -> Self {
        let settings = Settings::default();
        Self {
            token: None,
            channels: channels.into_iter().collect(),
            owner,
            prompts,
            profanity,
            audit_log_path: settings.audit_log.clone(),
            settings,
        }
    }

    /// Replaces the settings block.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.audit_log_path = settings.audit_log.clone();
        self.settings = settings;
        self
    }

    /// Platform token, when configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Channels the bot answers in.
    #[must_use]
    pub fn channels(&self) -> &BTreeSet<ChannelId> {
        &self.channels
    }

    /// Returns true when `channel` is allow-listed.
    #[must_use]
    pub fn is_allowed_channel(&self, channel: &ChannelId) -> bool {
        self.channels.contains(channel)
    }

    /// Owner allowed to run administrative commands.
    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Prompt templates loaded at startup.
    #[must_use]
    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Compiled banned-word filter.
    #[must_use]
    pub fn profanity(&self) -> &ProfanityFilter {
        &self.profanity
    }

    /// Raw settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generation parameters.
    #[must_use]
    pub fn generation(&self) -> GenerationSettings {
        self.settings.generation()
    }

    /// Resolved audit log location.
    #[must_use]
    pub fn audit_log_path(&self) -> &std::path::Path {
        &self.audit_log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_match_documented_values() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_retries, 10);
        assert_eq!(settings.generation().oracle_timeout, Duration::from_secs(60));
        assert_eq!(settings.oracle.provider, OracleProvider::Ollama);
    }

    #[test]
    fn parses_oracle_table() {
        let settings: Settings = toml::from_str(
            r#"
            max_length = 64
            seed = 7

            [oracle]
            provider = "openai"
            model = "gpt2"
            base_url = "http://localhost:8000"
            "#,
        )
        .unwrap();

        assert_eq!(settings.max_length, 64);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.oracle.provider, OracleProvider::Openai);
        assert_eq!(settings.oracle.base_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn rejects_unknown_keys_and_zero_budget() {
        assert!(toml::from_str::<Settings>("max_lenght = 5").is_err());
        assert!(toml::from_str::<Settings>("[oracle]\nmodle = \"gpt2\"").is_err());

        let settings = Settings {
            max_length: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { key: "max_length", .. })
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let mut config = BotConfig::new(
            [ChannelId::new("1").unwrap()],
            UserId::new("2").unwrap(),
            PromptSet::default(),
            ProfanityFilter::default(),
        );
        config.token = Some("super-secret".to_owned());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
