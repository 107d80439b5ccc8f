//! Process configuration.
//!
//! # Responsibility
//! - Collect startup settings from environment variables with defaults.
//!
//! # Invariants
//! - The database path is required; every other value has a default.
//! - Values are validated once here; callers receive typed settings.

use crate::logging::default_log_level;
use crate::model::guild::GuildId;
use crate::service::calendar_service::DEFAULT_CHANNEL_NAME;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CALENDAR_BOT_DB";
pub const ENV_LOG_DIR: &str = "CALENDAR_BOT_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "CALENDAR_BOT_LOG_LEVEL";
pub const ENV_CHANNEL_NAME: &str = "CALENDAR_BOT_CHANNEL";
pub const ENV_CHANNEL_ROOT: &str = "CALENDAR_BOT_CHANNEL_ROOT";
pub const ENV_GUILD_ID: &str = "CALENDAR_BOT_GUILD";

const DEFAULT_CHANNEL_ROOT: &str = "channels";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required setting absent or blank.
    Missing(&'static str),
    /// Setting present but not parseable.
    Invalid { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, value } => write!(f, "invalid value `{value}` for `{key}`"),
        }
    }
}

impl Error for ConfigError {}

/// Typed startup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub db_path: PathBuf,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub channel_name: String,
    /// Root directory of the directory-backed platform.
    pub channel_root: PathBuf,
    /// Guild used when a command names none.
    pub default_guild: Option<GuildId>,
}

impl BotConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating blank values as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(ENV_DB_PATH))?;
        let default_guild = match read(ENV_GUILD_ID) {
            Some(value) => Some(value.parse::<GuildId>().map_err(|_| ConfigError::Invalid {
                key: ENV_GUILD_ID,
                value,
            })?),
            None => None,
        };

        Ok(Self {
            db_path,
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            channel_name: read(ENV_CHANNEL_NAME)
                .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string()),
            channel_root: read(ENV_CHANNEL_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHANNEL_ROOT)),
            default_guild,
        })
    }
}
