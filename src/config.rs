//! Settings resolution: CLI flag → environment → TOML file → default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::synth::{
    client::DEFAULT_MODEL,
    transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT},
};

/// Environment variable holding the AI service key.
pub const API_KEY_ENV: &str = "SOMMELIER_API_KEY";
/// Older variable name, still honoured.
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";
/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "SOMMELIER_MODEL";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "SOMMELIER_BASE_URL";
/// Environment variable overriding the journal database path.
pub const DATABASE_ENV: &str = "SOMMELIER_DB";

const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();

/// Configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Config file is not valid TOML for [`FileConfig`].
    #[error("invalid config file {path}: {source}")]
    Toml {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// AI service key.
    pub api_key: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API base URL.
    pub base_url: Option<String>,
    /// Journal database path.
    pub database: Option<PathBuf>,
    /// HTTP timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

/// Command-line values, highest priority.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--api-key`.
    pub api_key: Option<String>,
    /// `--model`.
    pub model: Option<String>,
    /// `--database`.
    pub database: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Clone)]
pub struct Settings {
    /// AI service key; absence only fails synthesis calls.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Journal database path.
    pub database: PathBuf,
    /// HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Reads the config file (explicit path, or the default location when
    /// present) and the process environment.
    pub fn load(overrides: &Overrides, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => Some(read_config_file(path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(read_config_file(&path)?),
                _ => None,
            },
        };
        Ok(Self::resolve(overrides, file.unwrap_or_default(), |name| {
            std::env::var(name).ok()
        }))
    }

    /// Merges the three sources; `env` looks up environment variables.
    pub fn resolve(
        overrides: &Overrides,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let api_key = if let Some(key) = overrides.api_key.clone() {
            info!("API key taken from command line");
            Some(key)
        } else if let Some(key) = lookup(API_KEY_ENV) {
            info!("API key loaded from {API_KEY_ENV}");
            Some(key)
        } else if let Some(key) = lookup(LEGACY_API_KEY_ENV) {
            info!("API key loaded from {LEGACY_API_KEY_ENV}");
            Some(key)
        } else if let Some(key) = file.api_key.clone() {
            info!("API key loaded from config file");
            Some(key)
        } else {
            warn!("no API key configured; photo and search commands will fail until {API_KEY_ENV} is set");
            None
        };

        let model = overrides
            .model
            .clone()
            .or_else(|| lookup(MODEL_ENV))
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup(BASE_URL_ENV)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let database = overrides
            .database
            .clone()
            .or_else(|| lookup(DATABASE_ENV).map(PathBuf::from))
            .or(file.database)
            .unwrap_or_else(default_database_path);
        let request_timeout_secs = file
            .request_timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let settings = Self {
            api_key,
            model,
            base_url,
            database,
            request_timeout_secs,
        };
        debug!(?settings, "settings resolved");
        settings
    }

    /// HTTP timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parses a TOML config file.
pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// `<config dir>/sommelier/config.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sommelier").join("config.toml"))
}

/// `<data dir>/sommelier/journal.db`, or `sommelier-journal.db` in the
/// working directory when the platform has no data dir.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("sommelier").join("journal.db"))
        .unwrap_or_else(|| PathBuf::from("sommelier-journal.db"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let s = Settings::resolve(&Overrides::default(), FileConfig::default(), env_from(&[]));
        assert!(s.api_key.is_none());
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = FileConfig {
            api_key: Some("from-file".into()),
            model: Some("file-model".into()),
            ..FileConfig::default()
        };
        let env = env_from(&[(API_KEY_ENV, "from-env"), (MODEL_ENV, "env-model")]);
        let overrides = Overrides {
            api_key: Some("from-cli".into()),
            ..Overrides::default()
        };
        let s = Settings::resolve(&overrides, file.clone(), &env);
        assert_eq!(s.api_key.as_deref(), Some("from-cli"));
        assert_eq!(s.model, "env-model");

        let s = Settings::resolve(&Overrides::default(), file.clone(), &env);
        assert_eq!(s.api_key.as_deref(), Some("from-env"));

        let s = Settings::resolve(&Overrides::default(), file, env_from(&[]));
        assert_eq!(s.api_key.as_deref(), Some("from-file"));
        assert_eq!(s.model, "file-model");
    }

    #[test]
    fn legacy_variable_and_blank_values() {
        let s = Settings::resolve(
            &Overrides::default(),
            FileConfig::default(),
            env_from(&[(API_KEY_ENV, "  "), (LEGACY_API_KEY_ENV, "legacy")]),
        );
        assert_eq!(s.api_key.as_deref(), Some("legacy"));
    }

    #[test]
    fn toml_file_parses_and_rejects_unknown_keys() {
        let cfg: FileConfig = toml::from_str(
            "api_key = \"k\"\ndatabase = \"/tmp/wine.db\"\nrequest_timeout_secs = 30\n",
        )
        .expect("parse");
        assert_eq!(cfg.database, Some(PathBuf::from("/tmp/wine.db")));
        assert_eq!(cfg.request_timeout_secs, Some(30));
        assert!(toml::from_str::<FileConfig>("colour = \"red\"").is_err());
    }

    #[test]
    fn debug_output_redacts_key() {
        let s = Settings::resolve(
            &Overrides::default(),
            FileConfig::default(),
            env_from(&[(API_KEY_ENV, "super-secret")]),
        );
        assert!(!format!("{s:?}").contains("super-secret"));
    }
}
