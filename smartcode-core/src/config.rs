//! Client configuration.
//!
//! Resolution order for every field: environment override, then
//! `$XDG_CONFIG_HOME/smartcode/config.toml` (falling back to
//! `~/.config/smartcode/config.toml`), then built-in defaults. Config errors are
//! soft failures: a missing or malformed file yields the defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Service address used when neither the environment nor the config file sets one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding the service base URL.
pub const API_URL_ENV: &str = "SMARTCODE_API_URL";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the review service, without a trailing slash.
    pub api_url: String,
    /// Built-in theme name, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub theme: String,
    /// Directory holding the local storage database.
    pub data_dir: PathBuf,
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    theme: Option<String>,
    data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            theme: "catppuccin-mocha".to_owned(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Loads the config from the default path.
    ///
    /// The API URL comes from `api_url_flag`, then `SMARTCODE_API_URL`, then the file.
    pub fn load(api_url_flag: Option<&str>) -> Self {
        let env_url = std::env::var(API_URL_ENV).ok();
        let url_override = api_url_flag.filter(|u| !u.trim().is_empty()).or(env_url.as_deref());
        Self::load_from(&config_path(), url_override)
    }

    /// Loads the config from `path`, then applies `api_url_override` if it is non-empty.
    pub fn load_from(path: &Path, api_url_override: Option<&str>) -> Self {
        let file = read_config_file(path);
        let defaults = Self::default();

        let api_url = api_url_override
            .filter(|u| !u.trim().is_empty())
            .map(str::to_owned)
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        Self {
            api_url: api_url.trim().trim_end_matches('/').to_owned(),
            theme: file.theme.unwrap_or(defaults.theme),
            data_dir: file.data_dir.unwrap_or(defaults.data_dir),
        }
    }

    /// Path of the local storage database inside `data_dir`.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("storage.db")
    }
}

/// Returns the path to the smartcode config file.
///
/// Prefers `$XDG_CONFIG_HOME/smartcode/config.toml`; falls back to
/// `~/.config/smartcode/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("smartcode").join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smartcode")
}

fn read_config_file(path: &Path) -> ConfigFile {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return ConfigFile::default(),
    };
    match toml::from_str(&raw) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("config parse error in {}: {}", path.display(), e);
            ConfigFile::default()
        }
    }
}
