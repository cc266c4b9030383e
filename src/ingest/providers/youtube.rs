use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::ingest::types::{RawPayload, SourceAdapter, VideoSearchResponse};

pub const NAME: &str = "YouTube";

/// Video search adapter. Critical: it needs explicit configuration, so its
/// failures are shown to the user.
pub struct VideoSearchAdapter {
    client: Client,
    endpoint: String,
    query: String,
    max_results: u32,
    credential: String,
}

impl VideoSearchAdapter {
    pub fn from_config(cfg: &FeedConfig) -> Self {
        Self {
            client: http_client(cfg.source_timeout()),
            endpoint: cfg.video_endpoint.clone(),
            query: cfg.search_query.clone(),
            max_results: cfg.max_results,
            credential: cfg.credential.trim().to_string(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Full request URL including the credential. Never log it.
    pub fn request_url(&self) -> Result<Url, FeedError> {
        let max = self.max_results.to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("part", "snippet"),
                ("q", self.query.as_str()),
                ("type", "video"),
                ("maxResults", max.as_str()),
                ("key", self.credential.as_str()),
            ],
        )
        .map_err(|e| FeedError::configuration(NAME, format!("invalid endpoint '{}': {e}", self.endpoint)))
    }

    async fn fetch_search(&self) -> Result<VideoSearchResponse, FeedError> {
        let url = self.request_url()?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::request(NAME, format!("transport error: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            // Error responses usually carry {"error":{"message":..}}; use it when present.
            let detail = resp
                .json::<VideoSearchResponse>()
                .await
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .map(|m| format!(": {m}"))
                .unwrap_or_default();
            return Err(FeedError::request(NAME, format!("HTTP {status}{detail}")));
        }

        let body: VideoSearchResponse = resp
            .json()
            .await
            .map_err(|e| FeedError::request(NAME, format!("malformed response: {}", e.without_url())))?;

        if let Some(err) = &body.error {
            let msg = err.message.as_deref().unwrap_or("unknown error");
            return Err(FeedError::request(NAME, format!("API error: {msg}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl SourceAdapter for VideoSearchAdapter {
    async fn fetch(&self) -> Result<RawPayload, FeedError> {
        if self.credential.is_empty() {
            return Err(FeedError::configuration(NAME, "API credential is missing or blank"));
        }

        let t0 = Instant::now();
        let res = self.fetch_search().await;
        histogram!("feed_fetch_ms", "source" => NAME).record(t0.elapsed().as_secs_f64() * 1_000.0);

        match res {
            Ok(body) => {
                tracing::info!(
                    target: "feed",
                    source = NAME,
                    items = body.items.as_ref().map_or(0, Vec::len),
                    "video search fetched"
                );
                Ok(RawPayload::Video(body))
            }
            Err(e) => {
                tracing::warn!(target: "feed", source = NAME, error = %e, "video search failed");
                counter!("feed_source_errors_total", "source" => NAME).increment(1);
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn critical(&self) -> bool {
        true
    }
}

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(concat!("feed-aggregator/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(
                target: "feed",
                error = %e,
                "http client builder failed; falling back to a default client without user agent or timeouts"
            );
            Client::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_carries_all_parameters() {
        let cfg = FeedConfig {
            credential: "k3y".into(),
            search_query: "rust & tokio".into(),
            max_results: 7,
            ..FeedConfig::default()
        };
        let url = VideoSearchAdapter::from_config(&cfg).request_url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(url.as_str().starts_with("https://www.googleapis.com/youtube/v3/search?"));
        assert!(pairs.contains(&("part".into(), "snippet".into())));
        assert!(pairs.contains(&("q".into(), "rust & tokio".into())));
        assert!(pairs.contains(&("type".into(), "video".into())));
        assert!(pairs.contains(&("maxResults".into(), "7".into())));
        assert!(pairs.contains(&("key".into(), "k3y".into())));
    }

    #[tokio::test]
    async fn configured_client_enforces_its_timeout() {
        use tokio::net::TcpListener;

        // Accepts but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let client = http_client(Duration::from_millis(200));
        let started = Instant::now();
        let err = client.get(format!("http://{addr}/")).send().await.unwrap_err();
        assert!(err.is_timeout(), "{err}");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn blank_credential_fails_before_any_request() {
        let cfg = FeedConfig {
            credential: "   ".into(),
            // Unroutable on purpose: a request here would error differently.
            video_endpoint: "http://127.0.0.1:1/search".into(),
            ..FeedConfig::default()
        };
        let err = VideoSearchAdapter::from_config(&cfg).fetch().await.unwrap_err();
        assert!(err.is_configuration(), "got {err:?}");
    }
}
