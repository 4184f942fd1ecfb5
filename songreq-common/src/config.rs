//! Configuration loading
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `SONGREQ_CONFIG` environment variable
//! 3. `<config_dir>/songreq/config.toml`
//! 4. Built-in defaults (no file)
//!
//! Spotify credentials may additionally be supplied through environment
//! variables, which win over the file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SONGREQ_CONFIG";

/// Spotify's documented per-call cap for adding playlist items
pub const MAX_BATCH_SIZE: usize = 100;

/// Spotify's maximum `limit` for track search
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub requests: RequestsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Spotify application credentials and endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_accounts_base_url")]
    pub accounts_base_url: String,
}

/// Playlist created by each import run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistConfig {
    #[serde(default = "default_playlist_name")]
    pub name: String,
    #[serde(default = "default_playlist_description")]
    pub description: String,
    #[serde(default = "default_true")]
    pub public: bool,
    /// Track ids per bulk-add call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Visitor-facing listing and search limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestsConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:5000/callback".to_string()
}

fn default_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_accounts_base_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_playlist_name() -> String {
    "Imported Web Requests".to_string()
}

fn default_playlist_description() -> String {
    "Collaborative playlist created from web requests".to_string()
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_recent_limit() -> usize {
    10
}

fn default_search_limit() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: default_redirect_uri(),
            api_base_url: default_api_base_url(),
            accounts_base_url: default_accounts_base_url(),
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            name: default_playlist_name(),
            description: default_playlist_description(),
            public: true,
            batch_size: default_batch_size(),
        }
    }
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SpotifyConfig {
    /// Both client id and secret are present and non-blank
    pub fn has_credentials(&self) -> bool {
        is_set(&self.client_id) && is_set(&self.client_secret)
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Resolve, load, apply environment overrides and validate
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                info!("No configuration file found, using built-in defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override Spotify credentials from the environment
    ///
    /// `SONGREQ_SPOTIFY_*` wins over the legacy `SPOTIPY_*` names.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_value(&["SONGREQ_SPOTIFY_CLIENT_ID", "SPOTIPY_CLIENT_ID"]) {
            self.spotify.client_id = Some(v);
        }
        if let Some(v) = env_value(&["SONGREQ_SPOTIFY_CLIENT_SECRET", "SPOTIPY_CLIENT_SECRET"]) {
            self.spotify.client_secret = Some(v);
        }
        if let Some(v) = env_value(&["SONGREQ_SPOTIFY_REDIRECT_URI", "SPOTIPY_REDIRECT_URI"]) {
            self.spotify.redirect_uri = v;
        }
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.playlist.batch_size == 0 || self.playlist.batch_size > MAX_BATCH_SIZE {
            return Err(Error::Config(format!(
                "playlist.batch_size must be between 1 and {} (got {})",
                MAX_BATCH_SIZE, self.playlist.batch_size
            )));
        }
        if self.requests.search_limit == 0 || self.requests.search_limit > MAX_SEARCH_LIMIT {
            return Err(Error::Config(format!(
                "requests.search_limit must be between 1 and {} (got {})",
                MAX_SEARCH_LIMIT, self.requests.search_limit
            )));
        }
        if self.requests.recent_limit == 0 {
            return Err(Error::Config(
                "requests.recent_limit must be at least 1".to_string(),
            ));
        }
        if self.playlist.name.trim().is_empty() {
            return Err(Error::Config("playlist.name must not be empty".to_string()));
        }
        Ok(())
    }
}

fn env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
}

/// Locate the config file to load, if any
///
/// An explicitly named file (CLI or env) must exist; the per-user default is
/// optional.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return require_exists(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return require_exists(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    if let Some(path) = default_config_path() {
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // Priority 4: Built-in defaults
    Ok(None)
}

fn require_exists(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}

/// `<config_dir>/songreq/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songreq").join("config.toml"))
}
