//! Store configuration read from the environment.
//!
//! # Responsibility
//! - Collect the database location and logging settings in one value.
//! - Build a `FileConnectionProvider` from that value.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - `log_dir`, when present, is absolute.

use crate::db::FileConnectionProvider;
use crate::logging::default_log_level;
use ::config::{Config, Environment, Map};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BOOKDB";
pub const DATABASE_PATH_VAR: &str = "BOOKDB_DATABASE_PATH";
pub const LOG_LEVEL_VAR: &str = "BOOKDB_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "BOOKDB_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    RelativeLogDir(PathBuf),
    Load(::config::ConfigError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "environment variable {var} is not set"),
            Self::RelativeLogDir(path) => {
                write!(f, "{LOG_DIR_VAR} must be absolute, got `{}`", path.display())
            }
            Self::Load(err) => write!(f, "failed to load configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Missing(_) | Self::RelativeLogDir(_) => None,
        }
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(value: ::config::ConfigError) -> Self {
        Self::Load(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    #[serde(default = "StoreConfig::default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Config for `database_path` with default logging settings.
    pub fn for_database(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            log_level: Self::default_log_level(),
            log_dir: None,
        }
    }

    /// Loads `BOOKDB_*` variables, reading a `.env` file first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing `.env` file is fine.
        let _ = dotenvy::dotenv();
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as `from_env`, with variables taken from `vars` instead of the
    /// process environment.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    pub fn provider(&self) -> FileConnectionProvider {
        FileConnectionProvider::new(self.database_path.clone())
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(environment.ignore_empty(true))
            .build()?;

        if let Err(::config::ConfigError::NotFound(_)) = cfg.get_string("database_path") {
            return Err(ConfigError::Missing(DATABASE_PATH_VAR));
        }

        let config: Self = cfg.try_deserialize()?;
        config.normalized()
    }

    /// Trims values, treats blank ones as unset and checks `log_dir`.
    fn normalized(self) -> Result<Self, ConfigError> {
        let database_path = trimmed(&self.database_path)
            .ok_or(ConfigError::Missing(DATABASE_PATH_VAR))?;

        let log_level = match self.log_level.trim() {
            "" => Self::default_log_level(),
            level => level.to_string(),
        };

        let log_dir = match self.log_dir.as_deref().and_then(trimmed) {
            Some(dir) if !dir.is_absolute() => return Err(ConfigError::RelativeLogDir(dir)),
            dir => dir,
        };

        Ok(Self {
            database_path,
            log_level,
            log_dir,
        })
    }

    fn default_log_level() -> String {
        default_log_level().to_string()
    }
}

fn trimmed(path: &Path) -> Option<PathBuf> {
    let text = path.to_string_lossy();
    let text = text.trim();
    (!text.is_empty()).then(|| PathBuf::from(text))
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DATABASE_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use ::config::Map;
    use std::path::{Path, PathBuf};

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn reads_all_variables() {
        let config = StoreConfig::from_vars(vars(&[
            (DATABASE_PATH_VAR, " /var/lib/bookdb/books.db "),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, "/var/log/bookdb"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/bookdb/books.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/bookdb")));
    }

    #[test]
    fn blank_optional_variables_fall_back_to_defaults() {
        let config = StoreConfig::from_vars(vars(&[
            (DATABASE_PATH_VAR, "books.db"),
            (LOG_LEVEL_VAR, "  "),
            (LOG_DIR_VAR, ""),
        ]))
        .unwrap();

        assert_eq!(config, StoreConfig::for_database("books.db"));
        assert_eq!(config.provider().path(), Path::new("books.db"));
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = StoreConfig::from_vars(vars(&[
            (DATABASE_PATH_VAR, "books.db"),
            ("OTHER_DATABASE_PATH", "/elsewhere.db"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("books.db"));
    }

    #[test]
    fn missing_or_blank_database_path_is_rejected() {
        let err = StoreConfig::from_vars(vars(&[(LOG_LEVEL_VAR, "info")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DATABASE_PATH_VAR)));

        let err = StoreConfig::from_vars(vars(&[(DATABASE_PATH_VAR, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DATABASE_PATH_VAR)));

        let err = StoreConfig::from_vars(vars(&[(DATABASE_PATH_VAR, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DATABASE_PATH_VAR)));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = StoreConfig::from_vars(vars(&[
            (DATABASE_PATH_VAR, "books.db"),
            (LOG_DIR_VAR, "logs"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(dir) if dir == PathBuf::from("logs")));
    }
}
