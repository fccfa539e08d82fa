//! Runtime configuration.
//!
//! # Responsibility
//! - Load settings from `config.json` (or an explicit path).
//! - Apply `TASKMANAGER_<KEY>` environment overrides on top.
//!
//! # Invariants
//! - Precedence is defaults < file < environment.
//! - A missing default `config.json` is not an error; a missing explicit
//!   file is.
//! - Loaded configs always pass [`Config::validate`].
//!
//! | Key | Default |
//! |-----|---------|
//! | `database_path` | `data/taskmanager.db` |
//! | `log_level` | `info` |
//! | `log_file` | `logs/taskmanager.log` (empty env value disables) |
//! | `max_tasks_per_user` | `100` |
//! | `max_projects` | `50` |
//! | `min_priority` / `max_priority` | `1` / `5` |
//! | `allow_reopen_completed` | `true` |

use crate::logging::normalize_level;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const ENV_PREFIX: &str = "TASKMANAGER_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application settings shared by the CLI and services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub max_tasks_per_user: u32,
    pub max_projects: u32,
    pub min_priority: i64,
    pub max_priority: i64,
    /// Whether a `completed` task may move back to `pending`/`in_progress`.
    pub allow_reopen_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data").join("taskmanager.db"),
            log_level: "info".to_string(),
            log_file: Some(PathBuf::from("logs").join("taskmanager.log")),
            max_tasks_per_user: 100,
            max_projects: 50,
            min_priority: 1,
            max_priority: 5,
            allow_reopen_completed: true,
        }
    }
}

impl Config {
    /// Loads file configuration then applies process environment overrides.
    ///
    /// With `explicit_path = None`, `config.json` in the working directory is
    /// read when present.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Applies `TASKMANAGER_<KEY>` pairs from `vars`. Unrelated pairs are ignored.
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "DATABASE_PATH" => self.database_path = PathBuf::from(value),
                "LOG_LEVEL" => self.log_level = value,
                "LOG_FILE" => {
                    self.log_file = if value.trim().is_empty() {
                        None
                    } else {
                        Some(PathBuf::from(value))
                    }
                }
                "MAX_TASKS_PER_USER" => self.max_tasks_per_user = parse_env(&key, &value)?,
                "MAX_PROJECTS" => self.max_projects = parse_env(&key, &value)?,
                "MIN_PRIORITY" => self.min_priority = parse_env(&key, &value)?,
                "MAX_PRIORITY" => self.max_priority = parse_env(&key, &value)?,
                "ALLOW_REOPEN_COMPLETED" => {
                    self.allow_reopen_completed = parse_env_bool(&key, &value)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Rejects settings no command could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path must not be empty".to_string(),
            ));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        if self.min_priority > self.max_priority {
            return Err(ConfigError::Invalid(format!(
                "min_priority {} is greater than max_priority {}",
                self.min_priority, self.max_priority
            )));
        }
        Ok(())
    }

    pub fn priority_range(&self) -> RangeInclusive<i64> {
        self.min_priority..=self.max_priority
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        })
}

fn parse_env_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true|false|yes|no|1|0".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn file_values_override_defaults_and_unknown_keys_are_ignored() {
        let config = Config::from_json_str(
            r#"{"max_tasks_per_user": 3, "log_level": "DEBUG", "date_format": "%Y-%m-%d"}"#,
        )
        .unwrap();
        assert_eq!(config.max_tasks_per_user, 3);
        assert_eq!(config.log_level, "DEBUG");
        assert_eq!(config.max_projects, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_takes_precedence_over_file() {
        let mut config = Config::from_json_str(r#"{"max_projects": 10}"#).unwrap();
        config
            .apply_env_overrides(env(&[
                ("TASKMANAGER_MAX_PROJECTS", "2"),
                ("TASKMANAGER_DATABASE_PATH", "/tmp/tm.db"),
                ("TASKMANAGER_ALLOW_REOPEN_COMPLETED", "no"),
                ("PATH", "/usr/bin"),
            ]))
            .unwrap();
        assert_eq!(config.max_projects, 2);
        assert_eq!(config.database_path, PathBuf::from("/tmp/tm.db"));
        assert!(!config.allow_reopen_completed);
    }

    #[test]
    fn empty_log_file_env_disables_file_logging() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[("TASKMANAGER_LOG_FILE", "")]))
            .unwrap();
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn unparsable_env_value_is_reported_with_key() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[("TASKMANAGER_MAX_TASKS_PER_USER", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("TASKMANAGER_MAX_TASKS_PER_USER"));
    }

    #[test]
    fn validate_rejects_inverted_priority_range_and_unknown_level() {
        let inverted = Config {
            min_priority: 4,
            max_priority: 2,
            ..Config::default()
        };
        assert!(inverted.validate().is_err());

        let bad_level = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
