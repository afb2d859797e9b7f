//! Environment-driven configuration.
//!
//! # Invariants
//! - All required keys are checked before failing, so one error lists every
//!   missing variable.
//! - Blank values count as missing.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "OUTCOME_ATLAS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "OUTCOME_ATLAS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "OUTCOME_ATLAS_LOG_DIR";
pub const ENV_CACHE_PATH: &str = "OUTCOME_ATLAS_CACHE_PATH";

const REQUIRED_KEYS: [&str; 1] = [ENV_DB_PATH];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variables that were absent or blank.
    Missing(Vec<String>),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(keys) => write!(
                f,
                "missing required environment variables: {}",
                keys.join(", ")
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    /// Local JSON cache used by sync sessions.
    pub cache_path: Option<PathBuf>,
}

impl AtlasConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a key to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let missing = missing_keys(&value);
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            db_path: value(ENV_DB_PATH).map(PathBuf::from).unwrap_or_default(),
            log_level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
            cache_path: value(ENV_CACHE_PATH).map(PathBuf::from),
        })
    }
}

fn missing_keys<F>(value: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|&key| value(key).is_none())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{AtlasConfig, ConfigError, ENV_DB_PATH};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_db_path_is_reported_by_name() {
        let err = AtlasConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![ENV_DB_PATH.to_string()]));

        let err = AtlasConfig::from_lookup(lookup(&[(ENV_DB_PATH, "   ")])).unwrap_err();
        assert!(err.to_string().contains(ENV_DB_PATH));
    }

    #[test]
    fn optional_keys_fall_back() {
        let config = AtlasConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/atlas.db"),
            ("OUTCOME_ATLAS_LOG_LEVEL", "warn"),
            ("OUTCOME_ATLAS_CACHE_PATH", "/tmp/atlas-cache.json"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/atlas.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
        assert_eq!(
            config.cache_path,
            Some(PathBuf::from("/tmp/atlas-cache.json"))
        );
    }
}
