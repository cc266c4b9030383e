use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{header, Client, Url};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::ingest::types::{MicroblogPayload, RawPayload, SourceAdapter};

use super::youtube::http_client;

pub const NAME: &str = "Twitter";

/// Static microblog sample document. Non-critical: any failure degrades to an
/// empty payload.
pub struct StaticSampleAdapter {
    mode: Mode,
}

enum Mode {
    File(PathBuf),
    Http { url: Url, client: Client },
}

impl StaticSampleAdapter {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::File(path.into()),
        }
    }

    pub fn from_url(url: Url, client: Client) -> Self {
        Self {
            mode: Mode::Http { url, client },
        }
    }

    /// `static_source` is an http(s) URL or a file path.
    pub fn from_config(cfg: &FeedConfig) -> Self {
        let src = cfg.static_source.trim();
        match Url::parse(src) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Self::from_url(url, http_client(cfg.source_timeout()))
            }
            _ => Self::from_path(src),
        }
    }

    async fn load(&self) -> Result<MicroblogPayload> {
        match &self.mode {
            Mode::File(path) => {
                let s = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading sample document {}", path.display()))?;
                serde_json::from_str(&s).context("parsing sample document")
            }
            Mode::Http { url, client } => {
                let resp = client
                    .get(cache_busted(url))
                    .header(header::CACHE_CONTROL, "no-cache")
                    .header(header::PRAGMA, "no-cache")
                    .send()
                    .await
                    .context("sample document http get()")?;
                if !resp.status().is_success() {
                    bail!("sample document http status {}", resp.status());
                }
                resp.json().await.context("parsing sample document")
            }
        }
    }
}

/// Append `v=<unix millis>` so intermediaries never serve a stale copy.
pub fn cache_busted(url: &Url) -> Url {
    let mut u = url.clone();
    let v = chrono::Utc::now().timestamp_millis().to_string();
    u.query_pairs_mut().append_pair("v", &v);
    u
}

#[async_trait]
impl SourceAdapter for StaticSampleAdapter {
    async fn fetch(&self) -> Result<RawPayload, FeedError> {
        let t0 = Instant::now();
        let payload = match self.load().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "feed", source = NAME, error = ?e, "sample document unavailable, using empty payload");
                counter!("feed_source_errors_total", "source" => NAME).increment(1);
                MicroblogPayload::default()
            }
        };
        histogram!("feed_fetch_ms", "source" => NAME).record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(RawPayload::Microblog(payload))
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn critical(&self) -> bool {
        false
    }
}
