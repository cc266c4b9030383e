// src/config/feed.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "FEED_CONFIG_PATH";
pub const ENV_API_KEY: &str = "YOUTUBE_API_KEY";
pub const ENV_SEARCH_QUERY: &str = "FEED_SEARCH_QUERY";
pub const ENV_MAX_RESULTS: &str = "FEED_MAX_RESULTS";

pub const DEFAULT_CONFIG_TOML: &str = "config/feed.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/feed.json";

pub const DEFAULT_SEARCH_QUERY: &str = "web development";
pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const DEFAULT_VIDEO_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
pub const DEFAULT_STATIC_SOURCE: &str = "static/twitter.json";
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 5_000;

// The search API rejects anything outside 0..=50; zero results is pointless.
const MAX_RESULTS_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

fn default_search_query() -> String {
    DEFAULT_SEARCH_QUERY.to_string()
}
fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}
fn default_video_endpoint() -> String {
    DEFAULT_VIDEO_ENDPOINT.to_string()
}
fn default_static_source() -> String {
    DEFAULT_STATIC_SOURCE.to_string()
}
fn default_source_timeout_ms() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_MS
}

/// What to store as `date` when a record carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDatePolicy {
    /// Unix epoch: undated items sink to the end, same position on every load.
    #[default]
    Epoch,
    /// Wall clock at normalization time: undated items float to the top.
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Video search API key. Blank means the video source is not attempted.
    /// "ENV" means: read from YOUTUBE_API_KEY.
    #[serde(default)]
    pub credential: String,
    #[serde(default = "default_search_query")]
    pub search_query: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_video_endpoint")]
    pub video_endpoint: String,
    /// File path, or an http(s) URL serving the sample document.
    #[serde(default = "default_static_source")]
    pub static_source: String,
    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,
    #[serde(default)]
    pub missing_date: MissingDatePolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            credential: String::new(),
            search_query: default_search_query(),
            max_results: default_max_results(),
            video_endpoint: default_video_endpoint(),
            static_source: default_static_source(),
            source_timeout_ms: default_source_timeout_ms(),
            missing_date: MissingDatePolicy::default(),
        }
    }
}

impl FeedConfig {
    /// Load from an explicit TOML or JSON file (picked by extension, JSON
    /// otherwise tried as a fallback), then sanitize.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&data, &ext)
            .with_context(|| format!("parsing feed config {}", path.display()))?;

        // Resolve credential if "ENV"
        if cfg.credential.trim().eq_ignore_ascii_case("env") {
            cfg.credential = std::env::var(ENV_API_KEY)
                .map_err(|_| anyhow!("Missing {ENV_API_KEY} env var"))?;
        }

        cfg.sanitize();
        Ok(cfg)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $FEED_CONFIG_PATH
    /// 2) config/feed.toml
    /// 3) config/feed.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_TOML).exists() {
            Self::load_from_file(DEFAULT_CONFIG_TOML)?
        } else if Path::new(DEFAULT_CONFIG_JSON).exists() {
            Self::load_from_file(DEFAULT_CONFIG_JSON)?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.trim().is_empty() {
                self.credential = key;
            }
        }
        if let Ok(q) = std::env::var(ENV_SEARCH_QUERY) {
            if !q.trim().is_empty() {
                self.search_query = q;
            }
        }
        if let Ok(n) = std::env::var(ENV_MAX_RESULTS) {
            self.max_results = n
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_RESULTS} must be an integer, got '{n}'"))?;
        }
        self.sanitize();
        Ok(())
    }

    fn sanitize(&mut self) {
        self.credential = self.credential.trim().to_string();
        if self.search_query.trim().is_empty() {
            self.search_query = default_search_query();
        }
        self.max_results = self
            .max_results
            .clamp(*MAX_RESULTS_RANGE.start(), *MAX_RESULTS_RANGE.end());
        if self.source_timeout_ms == 0 {
            self.source_timeout_ms = default_source_timeout_ms();
        }
    }

    /// Whether the video source will be attempted at all.
    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FeedConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => serde_json::from_str::<FeedConfig>(s)
            .or_else(|_| toml::from_str::<FeedConfig>(s))
            .map_err(|_| anyhow!("unsupported feed config format")),
    }
}
