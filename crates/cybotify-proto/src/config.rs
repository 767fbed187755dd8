use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the TUI fetches playlists and analysis from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base HTTP URL of the feed, e.g. `http://127.0.0.1:8742`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Explicit WebSocket base URL. Derived from `base_url` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Fuzzy tolerance in [0, 1]. A candidate matches when its similarity is
    /// at least `1 - threshold`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Sort key applied when a detail view opens (`default` or `alphabetical`).
    #[serde(default = "default_sort")]
    pub default_sort: String,
    /// Repeat the first radar point at the end of each series.
    #[serde(default = "default_closed_loop")]
    pub closed_loop: bool,
}

/// Settings for the `cybotify-feed` development server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_library")]
    pub library: PathBuf,
    /// Pause between staged WebSocket frames.
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FeedConfig {
    /// WebSocket base: the explicit override, or `base_url` with its scheme
    /// swapped (`http` → `ws`, `https` → `wss`).
    pub fn ws_base(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.trim_end_matches('/').to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            format!("ws://{}", base)
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
            closed_loop: default_closed_loop(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            library: default_library(),
            stage_delay_ms: default_stage_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    format!("http://{}", platform::feed_address())
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_threshold() -> f64 {
    0.4
}

fn default_sort() -> String {
    "default".to_string()
}

fn default_closed_loop() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    platform::DEFAULT_FEED_PORT
}

fn default_library() -> PathBuf {
    platform::data_dir().join("library.json")
}

fn default_stage_delay_ms() -> u64 {
    400
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            search: SearchConfig::default(),
            view: ViewConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.base_url, "http://127.0.0.1:8742");
        assert_eq!(config.server.port, 8742);
        assert_eq!(config.view.default_sort, "default");
        assert!(config.view.closed_loop);
        assert!((config.search.threshold - 0.4).abs() < f64::EPSILON);
        assert!(config.server.library.ends_with("cybotify/library.json"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[search]\nthreshold = 0.2\n").unwrap();
        assert!((config.search.threshold - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.server.stage_delay_ms, 400);
        assert_eq!(config.feed.request_timeout_secs, 10);
    }

    #[test]
    fn test_ws_base_follows_scheme() {
        let mut feed = FeedConfig::default();
        assert_eq!(feed.ws_base(), "ws://127.0.0.1:8742");
        feed.base_url = "https://example.org/".to_string();
        assert_eq!(feed.ws_base(), "wss://example.org");
        feed.ws_url = Some("ws://other:1/".to_string());
        assert_eq!(feed.ws_base(), "ws://other:1");
    }
}
