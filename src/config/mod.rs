//! Configuration for the unitrack client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/unitrack/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_PAGE_SIZE: u32 = 9;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_NAVIGATE_DELAY_MS: u64 = 1500;

/// ~/.config/unitrack, or ./.unitrack when there is no home directory
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".config").join("unitrack"))
        .unwrap_or_else(|| PathBuf::from(".unitrack"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Config file exists but is unusable
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Cannot read config file {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => write!(
                f,
                "Failed to parse config file {}: {}\n  To reset, run `unitrack config --reset`.",
                path.display(),
                source
            ),
            Self::Invalid { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, e.g. http://localhost:8000/api
    pub api_url: String,

    /// Universities per list page
    pub page_size: u32,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// File holding the auth token between runs
    pub token_path: PathBuf,

    /// Pause after a successful save before leaving the form
    pub navigate_delay_ms: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_path: app_dir().join("token"),
            navigate_delay_ms: DEFAULT_NAVIGATE_DELAY_MS,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigate_delay(&self) -> Duration {
        Duration::from_millis(self.navigate_delay_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file, never rolled
    Never,
}

impl fmt::Display for LogRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        })
    }
}

/// `[logging]` settings read by `crate::logging::init`
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for our own events; RUST_LOG replaces the whole filter
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// "unitrack" gives unitrack.2026-01-15 with daily rotation
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            // Quiet by default: stderr is shared with command output
            level: "warn".to_string(),
            file_enabled: false,
            file_dir: app_dir().join("logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "unitrack".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure; every key optional
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub page_size: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub token_path: Option<String>,
    pub navigate_delay_ms: Option<u64>,

    #[serde(default)]
    pub logging: FileLogging,
}

/// `[logging]` as written in the file
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<LogRotation>,
    pub file_prefix: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/unitrack/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("unitrack").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Read and parse a config file. A missing file is an empty config;
    /// an unreadable or malformed one is an error.
    pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load configuration: env > file > defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file_config(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // API URL: env > file > default
        let api_url = env("UNITRACK_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        // Page size: env > file > default; zero would divide by nothing
        let page_size = match env("UNITRACK_PAGE_SIZE") {
            Some(v) => parse_env("UNITRACK_PAGE_SIZE", &v)?,
            None => file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                value: "0".to_string(),
            });
        }

        let request_timeout_secs = match env("UNITRACK_TIMEOUT_SECS") {
            Some(v) => parse_env("UNITRACK_TIMEOUT_SECS", &v)?,
            None => file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let token_path = env("UNITRACK_TOKEN_PATH")
            .or(file.token_path)
            .map(PathBuf::from)
            .unwrap_or_else(|| app_dir().join("token"));

        // Navigate delay: file > default
        let navigate_delay_ms = file.navigate_delay_ms.unwrap_or(DEFAULT_NAVIGATE_DELAY_MS);

        // Logging: file > default
        let defaults = LoggingConfig::default();
        let section = file.logging;
        let logging = LoggingConfig {
            level: section.level.unwrap_or(defaults.level),
            file_enabled: section.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: section.file_dir.map(PathBuf::from).unwrap_or(defaults.file_dir),
            file_rotation: section.file_rotation.unwrap_or(defaults.file_rotation),
            file_prefix: section.file_prefix.unwrap_or(defaults.file_prefix),
        };

        Ok(Self {
            api_url,
            page_size,
            request_timeout_secs,
            token_path,
            navigate_delay_ms,
            logging,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
