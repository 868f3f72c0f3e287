//! Runtime configuration for opening a tracker.
//!
//! # Responsibility
//! - Describe where persisted state and logs live.
//! - Read overrides from `HABIT_TRACKER_*` environment variables.
//!
//! # Invariants
//! - Unset variables keep defaults; set-but-blank variables count as unset.
//! - Invalid values are reported, never silently replaced.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "HABIT_TRACKER_DB";
pub const ENV_LOG_LEVEL: &str = "HABIT_TRACKER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HABIT_TRACKER_LOG_DIR";
pub const ENV_QUOTA_BYTES: &str = "HABIT_TRACKER_QUOTA_BYTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidQuota { value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuota { value } => write!(
                f,
                "{ENV_QUOTA_BYTES} must be a positive byte count, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Settings consumed by `HabitTracker::open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// SQLite file holding persisted state; `None` keeps state in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    /// Byte quota applied to the key-value backend.
    pub quota_bytes: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            quota_bytes: None,
        }
    }
}

impl TrackerConfig {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(quota) = read(ENV_QUOTA_BYTES) {
            config.quota_bytes = Some(parse_quota(&quota)?);
        }
        Ok(config)
    }
}

fn parse_quota(value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(ConfigError::InvalidQuota {
            value: value.to_string(),
        }),
    }
}
