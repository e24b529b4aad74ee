//! Bot configuration and collaborator factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lexidrill_core::model::UserId;
use lexidrill_core::traits::{GrammarChecker, Thesaurus, Transport, WordSource};
use lexidrill_core::{SchedulerConfig, ScoringPolicy};

use crate::console::ConsoleTransport;
use crate::dictionary::MerriamWebster;
use crate::grammar::{DisabledChecker, LanguageToolChecker};
use crate::telegram::TelegramTransport;
use crate::wordlist::{LocalThesaurus, LocalWordList, NoThesaurus};

/// User id attributed to console input lines without an `@<id>` prefix.
pub const CONSOLE_USER: UserId = UserId(1);

/// Telegram connection settings.
///
/// Note: Custom Debug impl masks the bot token.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            base_url: None,
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"***")
            .field("base_url", &self.base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

fn default_poll_timeout() -> u64 {
    30
}

/// Where drill words (and thesaurus lookups) come from.
///
/// Note: Custom Debug impl masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DictionaryConfig {
    MerriamWebster {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        thesaurus_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Words from a file. `/synonym` and `/antonym` use the Merriam-Webster
    /// thesaurus when `thesaurus_key` is set, otherwise the local lists.
    Local {
        path: PathBuf,
        #[serde(default)]
        thesaurus_key: Option<String>,
        #[serde(default)]
        synonyms_path: Option<PathBuf>,
        #[serde(default)]
        antonyms_path: Option<PathBuf>,
    },
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        DictionaryConfig::MerriamWebster {
            api_key: String::new(),
            thesaurus_key: String::new(),
            base_url: None,
        }
    }
}

impl std::fmt::Debug for DictionaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictionaryConfig::MerriamWebster { base_url, .. } => f
                .debug_struct("MerriamWebster")
                .field("api_key", &"***")
                .field("thesaurus_key", &"***")
                .field("base_url", base_url)
                .finish(),
            DictionaryConfig::Local {
                path,
                thesaurus_key,
                synonyms_path,
                antonyms_path,
            } => f
                .debug_struct("Local")
                .field("path", path)
                .field("thesaurus_key", &thesaurus_key.as_ref().map(|_| "***"))
                .field("synonyms_path", synonyms_path)
                .field("antonyms_path", antonyms_path)
                .finish(),
        }
    }
}

/// Grammar checking backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GrammarConfig {
    #[serde(rename = "languagetool")]
    LanguageTool {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_language")]
        language: String,
    },
    Disabled,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        GrammarConfig::LanguageTool {
            base_url: None,
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "en-US".to_string()
}

/// Word rotation and broadcast cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_words_per_session")]
    pub words_per_session: usize,
    #[serde(default)]
    pub rotate_on_start: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            words_per_session: default_words_per_session(),
            rotate_on_start: false,
        }
    }
}

fn default_interval() -> u64 {
    600
}
fn default_words_per_session() -> usize {
    5
}

impl BroadcastConfig {
    pub fn to_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(self.interval_secs),
            words_per_session: self.words_per_session,
            rotate_on_start: self.rotate_on_start,
            ..SchedulerConfig::default()
        }
    }
}

/// Top-level lexidrill configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexidrillConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub grammar: GrammarConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

impl LexidrillConfig {
    /// Check settings that would otherwise only fail at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.broadcast.words_per_session == 0 {
            anyhow::bail!("broadcast.words_per_session must be at least 1");
        }
        if self.broadcast.interval_secs == 0 {
            anyhow::bail!("broadcast.interval_secs must be at least 1");
        }
        if let DictionaryConfig::MerriamWebster { api_key, .. } = &self.dictionary {
            if api_key.is_empty() {
                anyhow::bail!(
                    "dictionary.api_key is empty; set LEXIDRILL_MW_KEY or use type = \"local\""
                );
            }
        }
        Ok(())
    }

    /// Override secrets from `LEXIDRILL_*` environment variables.
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("LEXIDRILL_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(key) = std::env::var("LEXIDRILL_MW_KEY") {
            if let DictionaryConfig::MerriamWebster { api_key, .. } = &mut self.dictionary {
                *api_key = key;
            }
        }
        if let Ok(key) = std::env::var("LEXIDRILL_THESAURUS_KEY") {
            match &mut self.dictionary {
                DictionaryConfig::MerriamWebster { thesaurus_key, .. } => *thesaurus_key = key,
                DictionaryConfig::Local { thesaurus_key, .. } => *thesaurus_key = Some(key),
            }
        }
    }

    /// Expand `${VAR}` references in every string setting.
    fn resolve_env_refs(&mut self) {
        self.telegram.bot_token = resolve_env_vars(&self.telegram.bot_token);
        resolve_opt(&mut self.telegram.base_url);

        match &mut self.dictionary {
            DictionaryConfig::MerriamWebster {
                api_key,
                thesaurus_key,
                base_url,
            } => {
                *api_key = resolve_env_vars(api_key);
                *thesaurus_key = resolve_env_vars(thesaurus_key);
                resolve_opt(base_url);
            }
            DictionaryConfig::Local {
                path,
                thesaurus_key,
                synonyms_path,
                antonyms_path,
            } => {
                resolve_path(path);
                resolve_opt(thesaurus_key);
                synonyms_path.iter_mut().for_each(resolve_path);
                antonyms_path.iter_mut().for_each(resolve_path);
            }
        }

        if let GrammarConfig::LanguageTool { base_url, language } = &mut self.grammar {
            resolve_opt(base_url);
            *language = resolve_env_vars(language);
        }
    }
}

fn resolve_opt(value: &mut Option<String>) {
    if let Some(v) = value {
        *v = resolve_env_vars(v);
    }
}

fn resolve_path(path: &mut PathBuf) {
    *path = PathBuf::from(resolve_env_vars(&path.to_string_lossy()));
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `lexidrill.toml` in the current directory
/// 2. `~/.config/lexidrill/config.toml`
///
/// Environment variable overrides: `LEXIDRILL_BOT_TOKEN`, `LEXIDRILL_MW_KEY`,
/// `LEXIDRILL_THESAURUS_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<LexidrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lexidrill.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LexidrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LexidrillConfig::default(),
    };

    config.apply_env_overrides();
    config.resolve_env_refs();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lexidrill"))
}

/// Create the word source described by `config`.
pub fn create_word_source(config: &DictionaryConfig) -> Result<Arc<dyn WordSource>> {
    match config {
        DictionaryConfig::MerriamWebster {
            api_key,
            thesaurus_key,
            base_url,
        } => Ok(Arc::new(MerriamWebster::new(
            api_key,
            thesaurus_key,
            base_url.clone(),
        ))),
        DictionaryConfig::Local { path, .. } => {
            let list = LocalWordList::load(path)
                .with_context(|| format!("failed to load word list: {}", path.display()))?;
            Ok(Arc::new(list))
        }
    }
}

/// Create the thesaurus for `/synonym` and `/antonym`.
///
/// A Merriam-Webster thesaurus key takes precedence over local lists.
/// With neither, every lookup comes back empty.
pub fn create_thesaurus(config: &DictionaryConfig) -> Result<Arc<dyn Thesaurus>> {
    match config {
        DictionaryConfig::MerriamWebster {
            api_key,
            thesaurus_key,
            base_url,
        } if !thesaurus_key.is_empty() => Ok(Arc::new(MerriamWebster::new(
            api_key,
            thesaurus_key,
            base_url.clone(),
        ))),
        DictionaryConfig::Local {
            thesaurus_key: Some(key),
            ..
        } if !key.is_empty() => Ok(Arc::new(MerriamWebster::new("", key, None))),
        DictionaryConfig::Local {
            synonyms_path,
            antonyms_path,
            ..
        } if synonyms_path.is_some() || antonyms_path.is_some() => {
            let thesaurus =
                LocalThesaurus::load(synonyms_path.as_deref(), antonyms_path.as_deref())
                    .context("failed to load thesaurus lists")?;
            Ok(Arc::new(thesaurus))
        }
        _ => Ok(Arc::new(NoThesaurus)),
    }
}

pub fn create_grammar_checker(config: &GrammarConfig) -> Arc<dyn GrammarChecker> {
    match config {
        GrammarConfig::LanguageTool { base_url, language } => Arc::new(LanguageToolChecker::new(
            base_url.clone(),
            Some(language.clone()),
        )),
        GrammarConfig::Disabled => Arc::new(DisabledChecker),
    }
}

/// Create the chat transport: stdin/stdout when `console` is set, Telegram
/// otherwise.
pub fn create_transport(config: &TelegramConfig, console: bool) -> Result<Arc<dyn Transport>> {
    if console {
        return Ok(Arc::new(ConsoleTransport::stdio(CONSOLE_USER)));
    }
    if config.bot_token.is_empty() {
        anyhow::bail!(
            "telegram.bot_token is empty; set LEXIDRILL_BOT_TOKEN or run with --console"
        );
    }
    Ok(Arc::new(TelegramTransport::new(
        &config.bot_token,
        config.base_url.clone(),
        Some(config.poll_timeout_secs),
    )))
}
