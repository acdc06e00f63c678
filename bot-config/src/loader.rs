//! Loads a [`BotConfig`] from a directory of flat files.
//!
//! | File | Required | Contents |
//! |------|----------|----------|
//! | `token.txt` | no | Platform token. |
//! | `channels.txt` | yes | One allow-listed channel id per line. |
//! | `owner.txt` | yes | Owner user id. |
//! | `prompts.txt` | no | One `\n`-escaped template per line. |
//! | `bad_words.txt` | no | One banned entry per line. |
//! | `settings.toml` | no | See [`Settings`]. |

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bot_policy::ProfanityFilter;
use bot_primitives::{ChannelId, UserId};
use bot_prompts::PromptSet;
use tracing::{debug, info};

use crate::schema::{BotConfig, Settings};
use crate::{ConfigError, ConfigResult};

/// Token file name.
pub const TOKEN_FILE: &str = "token.txt";
/// Channel allow-list file name.
pub const CHANNELS_FILE: &str = "channels.txt";
/// Owner id file name.
pub const OWNER_FILE: &str = "owner.txt";
/// Prompt template file name.
pub const PROMPTS_FILE: &str = "prompts.txt";
/// Banned-word file name.
pub const BAD_WORDS_FILE: &str = "bad_words.txt";
/// Generation settings file name.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Reads configuration files relative to a root directory.
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    root: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the configuration directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads and validates every configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required file is missing or empty, an
    /// identifier is malformed, a template or banned pattern is invalid, or
    /// `settings.toml` cannot be parsed.
    pub fn load(&self) -> ConfigResult<BotConfig> {
        let settings = self.settings()?;

        let token = self
            .read_optional(TOKEN_FILE)?
            .map(|raw| raw.trim().to_owned())
            .filter(|token| !token.is_empty());

        let channels = self.channels()?;
        let owner = self.owner()?;

        let prompts = match self.read_optional(PROMPTS_FILE)? {
            Some(raw) => PromptSet::parse(lines(&raw))?,
            None => {
                debug!("no {PROMPTS_FILE}; using default template");
                PromptSet::default()
            }
        };

        let profanity = match self.read_optional(BAD_WORDS_FILE)? {
            Some(raw) => ProfanityFilter::new(lines(&raw))?,
            None => ProfanityFilter::default(),
        };

        let audit_log_path = if settings.audit_log.is_absolute() {
            settings.audit_log.clone()
        } else {
            self.root.join(&settings.audit_log)
        };

        info!(
            root = %self.root.display(),
            channels = channels.len(),
            prompts = prompts.len(),
            banned = profanity.len(),
            "configuration loaded"
        );

        Ok(BotConfig {
            token,
            channels,
            owner,
            prompts,
            profanity,
            settings,
            audit_log_path,
        })
    }

    fn settings(&self) -> ConfigResult<Settings> {
        let path = self.root.join(SETTINGS_FILE);
        let settings = match self.read_optional(SETTINGS_FILE)? {
            Some(raw) => toml::from_str::<Settings>(&raw)
                .map_err(|source| ConfigError::Settings { path, source })?,
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn channels(&self) -> ConfigResult<BTreeSet<ChannelId>> {
        let path = self.root.join(CHANNELS_FILE);
        let raw = self.read_required(CHANNELS_FILE)?;
        lines(&raw)
            .map(|line| {
                ChannelId::new(line).map_err(|source| ConfigError::InvalidId {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }

    fn owner(&self) -> ConfigResult<UserId> {
        let path = self.root.join(OWNER_FILE);
        let raw = self.read_required(OWNER_FILE)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Empty { path });
        }
        UserId::new(trimmed).map_err(|source| ConfigError::InvalidId { path, source })
    }

    fn read_required(&self, name: &str) -> ConfigResult<String> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
    }

    fn read_optional(&self, name: &str) -> ConfigResult<Option<String>> {
        let path = self.root.join(name);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }
}

/// Non-blank lines with surrounding whitespace removed.
fn lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|line| !line.is_empty())
}
