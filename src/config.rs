//! Configuration loading
//!
//! Settings come from an optional TOML file (by default `config.toml` in the
//! system's standard config directory). API keys may also be supplied through
//! environment variables, which take precedence over the file.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3/";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_USER_AGENT: &str = concat!("cinefind/", env!("CARGO_PKG_VERSION"));

/// Environment variable overriding `[omdb] api_key`
pub const OMDB_API_KEY_ENV: &str = "CINEFIND_OMDB_API_KEY";
/// Environment variable overriding `[tmdb] api_key`
pub const TMDB_API_KEY_ENV: &str = "CINEFIND_TMDB_API_KEY";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory location
    #[error("Failed to determine config directory location")]
    ConfigDirectoryNotFound,

    /// Failed to read the config file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// The config file is not valid TOML or has wrongly typed values
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A configured URL cannot be parsed
    #[error("Invalid URL for {field}: {value:?} ({source})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },

    /// A provider API key was needed but not configured
    #[error("No {provider} API key configured (set {env} or `api_key` in the [{section}] section)")]
    MissingApiKey {
        provider: &'static str,
        section: &'static str,
        env: &'static str,
    },
}

/// Raw file layout; every value is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    omdb: OmdbSection,
    tmdb: TmdbSection,
    http: HttpSection,
    storage: StorageSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmdbSection {
    api_key: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TmdbSection {
    api_key: Option<String>,
    base_url: Option<String>,
    image_base_url: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HttpSection {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
    data_dir: Option<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub omdb: OmdbConfig,
    pub tmdb: TmdbConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub image_base_url: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Overrides the standard data directory
    pub data_dir: Option<PathBuf>,
}

impl OmdbConfig {
    /// Returns the API key or an error naming where to configure it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if no key is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey {
            provider: "OMDb",
            section: "omdb",
            env: OMDB_API_KEY_ENV,
        })
    }
}

impl TmdbConfig {
    /// Returns the API key or an error naming where to configure it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if no key is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey {
            provider: "TMDb",
            section: "tmdb",
            env: TMDB_API_KEY_ENV,
        })
    }
}

impl Config {
    /// Path of the config file in the system's standard config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs = directories::ProjectDirs::from("org", "cinefind", "cinefind")
            .ok_or(ConfigError::ConfigDirectoryNotFound)?;

        Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads configuration and applies environment overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Explicit config file; it must exist. Without it the default
    ///   location is used and a missing file means built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a URL in it
    /// is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => {
                let path = Self::default_path()?;
                if path.is_file() {
                    read_config_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "No config file, using defaults");
                    ConfigFile::default()
                }
            }
        };

        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Parses configuration from TOML text without consulting the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file = parse_config(content, Path::new("<inline>"))?;
        Self::resolve(file, |_| None)
    }

    fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env_key = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            omdb: OmdbConfig {
                api_key: env_key(OMDB_API_KEY_ENV).or(non_empty(file.omdb.api_key)),
                base_url: parse_base_url(
                    "omdb.base_url",
                    file.omdb.base_url.as_deref().unwrap_or(DEFAULT_OMDB_BASE_URL),
                )?,
            },
            tmdb: TmdbConfig {
                api_key: env_key(TMDB_API_KEY_ENV).or(non_empty(file.tmdb.api_key)),
                base_url: parse_base_url(
                    "tmdb.base_url",
                    file.tmdb.base_url.as_deref().unwrap_or(DEFAULT_TMDB_BASE_URL),
                )?,
                image_base_url: file
                    .tmdb
                    .image_base_url
                    .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()),
                language: file
                    .tmdb
                    .language
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            },
            http: HttpConfig {
                timeout: file
                    .http
                    .timeout_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
                user_agent: file
                    .http
                    .user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
            storage: StorageConfig {
                data_dir: file.storage.data_dir,
            },
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "Loaded config file");
    parse_config(&content, path)
}

fn parse_config(content: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parses an API root, adding the trailing slash relative joins depend on
fn parse_base_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };

    Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source: e,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
