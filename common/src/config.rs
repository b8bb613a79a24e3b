//! Configuration parsing – reads a KEY=VALUE file (`vidrec.conf`).
//!
//! Both console views load the same file; each ignores fields it does not
//! need.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

/// Environment variable that overrides `API_BASE_URL`.
pub const API_URL_ENV: &str = "VIDREC_API_URL";

/// Console configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // ── backend ──────────────────────────────────────────────────────
    /// Base URL of the recording backend, without the `/api` suffix.
    pub api_base_url: String,
    pub request_timeout_secs: u64,

    // ── timers ───────────────────────────────────────────────────────
    /// Recording-status poll period (session view).
    pub poll_interval_secs: u64,
    /// Video-list auto refresh period (dashboard view).
    pub refresh_interval_secs: u64,

    // ── dashboard actions ────────────────────────────────────────────
    pub download_dir: PathBuf,
    /// External player spawned with the stream URL on `play`.
    pub player_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_map(&HashMap::new())
    }
}

impl Config {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/vidrec/vidrec.conf"
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| -> Option<String> { map.get(key).cloned() };
        // Zero would spin the repeating tasks, so it falls back like a bad value.
        let get_secs = |key: &str, default: u64| -> u64 {
            get(key)
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Config {
            api_base_url: get("API_BASE_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://localhost:5000".into()),
            request_timeout_secs: get_secs("REQUEST_TIMEOUT_SECS", 30),
            poll_interval_secs: get_secs("POLL_INTERVAL_SECS", 1),
            refresh_interval_secs: get_secs("REFRESH_INTERVAL_SECS", 10),
            download_dir: PathBuf::from(get("DOWNLOAD_DIR").unwrap_or_else(|| ".".into())),
            player_command: get("PLAYER_COMMAND").filter(|s| !s.is_empty()),
        }
    }

    /// Apply `VIDREC_API_URL` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var(API_URL_ENV).ok().filter(|s| !s.is_empty()) {
            info!("{API_URL_ENV} overrides API base URL: {url}");
            self.api_base_url = url;
        }
        self
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored.
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let map = parse_conf(&text);
    info!("Loaded config from {}", path.display());

    Ok(Config::from_map(&map))
}

/// Load the config named on the command line, or the default file when it
/// exists, or built-in defaults.
///
/// An explicitly named file must exist; the default path is optional.
pub fn load_or_default(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => load(path)?,
        None => {
            let default = Path::new(Config::default_path());
            if default.exists() {
                load(default)?
            } else {
                info!("No config at {}, using defaults", default.display());
                Config::default()
            }
        }
    };
    Ok(config.with_env_overrides())
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────
