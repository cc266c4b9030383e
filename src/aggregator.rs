// src/aggregator.rs
//! Runs every source adapter concurrently, keeps each outcome, normalizes the
//! successes and produces one date-sorted [`AggregateResult`].

use metrics::{counter, gauge};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::config::{FeedConfig, MissingDatePolicy};
use crate::error::FeedError;
use crate::feed::{AggregateResult, Platform};
use crate::ingest::ensure_metrics_described;
use crate::ingest::providers::{StaticSampleAdapter, VideoSearchAdapter};
use crate::ingest::types::{RawPayload, SourceAdapter};
use crate::normalize;

/// Output of one aggregation run. `errors` only holds failures of critical
/// sources; everything else was logged and absorbed.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub result: AggregateResult,
    pub errors: Vec<FeedError>,
}

pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    timeout: Duration,
    missing_date: MissingDatePolicy,
}

impl Aggregator {
    /// Adapters are listed in arrival order; ties in the final sort keep it.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            timeout: Duration::from_millis(crate::config::feed::DEFAULT_SOURCE_TIMEOUT_MS),
            missing_date: MissingDatePolicy::default(),
        }
    }

    /// Video search first, then the static sample.
    pub fn from_config(cfg: &FeedConfig) -> Self {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(VideoSearchAdapter::from_config(cfg)),
            Arc::new(StaticSampleAdapter::from_config(cfg)),
        ];
        Self::new(adapters)
            .with_timeout(cfg.source_timeout())
            .with_missing_date(cfg.missing_date)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_missing_date(mut self, policy: MissingDatePolicy) -> Self {
        self.missing_date = policy;
        self
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Never fails: a total failure is an empty result plus reported errors.
    pub async fn aggregate(&self) -> Aggregation {
        ensure_metrics_described();
        counter!("feed_loads_total").increment(1);

        let outcomes = self.fetch_all_settled().await;

        let mut items = Vec::new();
        let mut errors = Vec::new();
        for (adapter, outcome) in self.adapters.iter().zip(outcomes) {
            let normalized = outcome.and_then(|payload| self.normalize_guarded(adapter.name(), &payload));
            match normalized {
                Ok(mut v) => {
                    tracing::debug!(target: "feed", source = adapter.name(), items = v.len(), "normalized");
                    items.append(&mut v);
                }
                Err(e) if adapter.critical() => {
                    tracing::warn!(target: "feed", source = adapter.name(), error = %e, "critical source failed");
                    errors.push(e);
                }
                Err(e) => {
                    tracing::info!(target: "feed", source = adapter.name(), error = %e, "non-critical source failed, treated as empty");
                }
            }
        }

        let result = AggregateResult::from_unsorted(items);

        for p in Platform::ALL {
            counter!("feed_items_total", "platform" => p.label()).increment(result.count_for(p) as u64);
        }
        gauge!("feed_last_load_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(
            target: "feed",
            items = result.len(),
            errors = errors.len(),
            "aggregation finished"
        );

        Aggregation { result, errors }
    }

    /// Spawn every adapter and wait for all of them; one failure never cuts
    /// the others short. Outcomes come back in adapter order.
    async fn fetch_all_settled(&self) -> Vec<Result<RawPayload, FeedError>> {
        let mut set = JoinSet::new();
        for (idx, adapter) in self.adapters.iter().enumerate() {
            let adapter = Arc::clone(adapter);
            let limit = self.timeout;
            set.spawn(async move {
                let res = match tokio::time::timeout(limit, adapter.fetch()).await {
                    Ok(res) => res,
                    Err(_) => {
                        counter!("feed_source_errors_total", "source" => adapter.name()).increment(1);
                        Err(FeedError::request(
                            adapter.name(),
                            format!("timed out after {} ms", limit.as_millis()),
                        ))
                    }
                };
                (idx, res)
            });
        }

        let mut slots: Vec<Option<Result<RawPayload, FeedError>>> =
            self.adapters.iter().map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, res)) => slots[idx] = Some(res),
                Err(e) => tracing::error!(target: "feed", error = %e, "source task did not complete"),
            }
        }

        // A slot left empty belongs to a task that panicked.
        slots
            .into_iter()
            .zip(&self.adapters)
            .map(|(slot, adapter)| {
                slot.unwrap_or_else(|| {
                    counter!("feed_source_errors_total", "source" => adapter.name()).increment(1);
                    Err(FeedError::request(adapter.name(), "source task panicked"))
                })
            })
            .collect()
    }

    fn normalize_guarded(
        &self,
        origin: &'static str,
        payload: &RawPayload,
    ) -> Result<Vec<crate::feed::FeedItem>, FeedError> {
        let policy = self.missing_date;
        catch_unwind(AssertUnwindSafe(|| normalize::normalize(payload, policy))).map_err(|_| {
            tracing::error!(target: "feed", source = origin, entries = payload.entry_count(), "normalizer panicked");
            FeedError::Normalization {
                origin,
                reason: "normalizer panicked".to_string(),
            }
        })
    }
}
