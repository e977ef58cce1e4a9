//! Application settings.
//!
//! Non-secret settings (prefixes, bot name, ledger defaults) come from
//! `config.toml`; credentials and connection strings come from the environment,
//! usually via `.env`. The resulting [`AppConfig`] is built once at startup and
//! shared read-only behind an `Arc`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_DATABASE_URL: &str = "sqlite://nikku.sqlite?mode=rwc";

/// Shape of `config.toml`. Every field is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FileConfig {
    /// Strings that mark a message as an explicit command invocation
    pub prefixes: Vec<String>,
    /// Name the chat trigger answers to
    pub bot_name: String,
    /// Weight-ledger defaults
    pub brad: BradSettings,
    /// New-user defaults
    pub users: UserSettings,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            prefixes: vec!["!f ".to_string()],
            bot_name: "mrfortnite".to_string(),
            brad: BradSettings::default(),
            users: UserSettings::default(),
        }
    }
}

/// Weight-ledger defaults
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BradSettings {
    /// Weight of a freshly created ledger; the first goal is this plus one
    pub default_weight: f64,
}

impl Default for BradSettings {
    fn default() -> Self {
        Self {
            default_weight: 70.0,
        }
    }
}

/// New-user defaults
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct UserSettings {
    /// DotmaCoins granted on registration
    pub starting_dotma_coin: i64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            starting_dotma_coin: 100,
        }
    }
}

/// Credentials for the conversational-AI service. All three must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatServiceSettings {
    /// API key
    pub api_key: Option<String>,
    /// API user id
    pub user_id: Option<String>,
    /// Conversation session name
    pub session: Option<String>,
}

impl ChatServiceSettings {
    /// Returns true when every credential is set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.user_id.is_some() && self.session.is_some()
    }
}

/// Fully resolved, immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Persistence connection string
    pub database_url: String,
    /// Users that must exist with developer access after bootstrap
    pub developer_ids: Vec<String>,
    /// Accepted command prefixes
    pub prefixes: Vec<String>,
    /// Name the chat trigger answers to
    pub bot_name: String,
    /// Weight-ledger defaults
    pub brad: BradSettings,
    /// New-user defaults
    pub users: UserSettings,
    /// Conversational-AI credentials
    pub chat: ChatServiceSettings,
}

impl AppConfig {
    /// Combines file settings with values looked up through `env`.
    ///
    /// `env` is a lookup function so tests can supply variables without
    /// touching the process environment.
    pub fn from_parts<F>(file: FileConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            developer_ids: non_empty("DEVELOPER_IDS")
                .map(|raw| parse_id_list(&raw))
                .unwrap_or_default(),
            prefixes: file.prefixes,
            bot_name: file.bot_name,
            brad: file.brad,
            users: file.users,
            chat: ChatServiceSettings {
                api_key: non_empty("CHATBOT_API_KEY"),
                user_id: non_empty("CHATBOT_USER_ID"),
                session: non_empty("CHATBOT_SESSION"),
            },
        }
    }

    /// Loads `config.toml` from `path` (defaults when absent) and reads the
    /// process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = load_file_config(path)?;
        Ok(Self::from_parts(file, |key| std::env::var(key).ok()))
    }
}

/// Reads and parses `config.toml`. A missing file yields the defaults.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        warn!("No config file at {:?}, using defaults.", path_ref);
        return Ok(FileConfig::default());
    }
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {path_ref:?}: {e}"),
    })
}

/// Splits a comma-separated id list, dropping blanks and duplicates.
#[must_use]
pub fn parse_id_list(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
