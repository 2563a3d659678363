//! Configuration loading and validation.
//!
//! A single human-owned `config.toml` drives both screens. Every section has
//! defaults, so a missing file is not an error.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PARISH_ADMIN_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API location and transport settings.
    pub api: ApiConfig,

    /// Message inbox behaviour.
    pub inbox: InboxConfig,

    /// Content editor persistence.
    pub content: ContentConfig,

    /// Hosted upload widget settings.
    pub upload: UploadConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are resolved against.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Parse the base URL, normalised to end with `/` so relative joins keep
    /// any path prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn base(&self) -> anyhow::Result<Url> {
        let mut raw = self.base_url.trim().to_owned();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("invalid api.base_url {:?}", self.base_url))
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Inbox settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxConfig {
    /// Messages per page (`limit` query parameter).
    pub page_size: u32,

    /// Trailing debounce applied to search edits, in milliseconds.
    pub search_debounce_ms: u64,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl InboxConfig {
    /// Search debounce as a [`Duration`].
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Which content store backs the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBackend {
    /// Process-local store; nothing survives the process.
    #[default]
    Memory,
    /// `/api/events` and `/api/sermons` on the configured API.
    Http,
}

impl std::str::FromStr for ContentBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "http" => Ok(Self::Http),
            other => anyhow::bail!("unknown content backend {other:?}, expected 'memory' or 'http'"),
        }
    }
}

/// Content editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Store implementation.
    pub backend: ContentBackend,

    /// Seed the in-memory store with sample events and sermons.
    pub seed_demo: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::Memory,
            seed_demo: true,
        }
    }
}

/// Upload widget settings, handed to the widget on `configure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Hosted media account name.
    pub cloud_name: String,

    /// Unsigned upload preset.
    pub upload_preset: String,

    /// Sources offered by the widget.
    pub sources: Vec<String>,

    /// Source selected when the widget opens.
    pub default_source: String,

    /// Whether the widget offers cropping.
    pub cropping: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: String::new(),
            sources: vec!["local".to_owned(), "camera".to_owned(), "url".to_owned()],
            default_source: "local".to_owned(),
            cropping: false,
        }
    }
}

// Default value functions for serde

fn default_base_url() -> String {
    "http://localhost:5000".to_owned()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_page_size() -> u32 {
    10
}
fn default_search_debounce_ms() -> u64 {
    300
}

impl Config {
    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver so tests never touch the process environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("PARISH_API_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = env("PARISH_PAGE_SIZE") {
            match v.parse() {
                Ok(n) => self.inbox.page_size = n,
                Err(_) => tracing::warn!(
                    var = "PARISH_PAGE_SIZE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("PARISH_CONTENT_BACKEND") {
            match v.parse() {
                Ok(backend) => self.content.backend = backend,
                Err(e) => tracing::warn!(
                    var = "PARISH_CONTENT_BACKEND",
                    value = %v,
                    error = %e,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero page size or an unparsable base URL.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.inbox.page_size == 0 {
            anyhow::bail!("inbox.page_size must be at least 1");
        }
        self.api.base()?;
        Ok(())
    }

    /// Render as TOML, used by `init`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}

/// Load config from a TOML file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::debug!(path = %path.display(), "loading config from file");
            toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}

/// Load config from the resolved path, apply env overrides, and validate.
///
/// # Errors
///
/// Returns an error if the file is unreadable, malformed, or invalid.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = resolve_config_path(explicit, |key| std::env::var(key).ok())?;
    let mut config = load_config(&path)?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Resolve the config file path: explicit flag, then `$PARISH_ADMIN_CONFIG`,
/// then `~/.parish-admin/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory is needed but unknown.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(p) = env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(p));
    }
    Ok(config_dir()?.join("config.toml"))
}

/// Resolve the default config directory (`~/.parish-admin/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".parish-admin"))
}
