// src/state.rs
//! Current feed + active filter, owned by one state object.
//!
//! `FeedState` is the plain single-threaded model; `FeedHandle` shares it
//! across request handlers and serializes writes.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::AbortHandle;

use crate::aggregator::{Aggregation, Aggregator};
use crate::error::FeedError;
use crate::feed::{AggregateResult, FeedItem, PlatformFilter};

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    result: AggregateResult,
    filter: PlatformFilter,
    errors: Vec<FeedError>,
    loaded_at: Option<DateTime<Utc>>,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the output of a finished load. The filter is not touched here;
    /// it was reset when the load started.
    pub fn replace(&mut self, aggregation: Aggregation) {
        self.result = aggregation.result;
        self.errors = aggregation.errors;
        self.loaded_at = Some(Utc::now());
    }

    pub fn set_filter(&mut self, filter: PlatformFilter) {
        self.filter = filter;
    }

    /// Back to the initial empty/"all" state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Items matching the active filter, in sorted order.
    pub fn visible(&self) -> Vec<&FeedItem> {
        self.result.filtered(self.filter)
    }

    pub fn filter(&self) -> PlatformFilter {
        self.filter
    }

    pub fn result(&self) -> &AggregateResult {
        &self.result
    }

    pub fn errors(&self) -> &[FeedError] {
        &self.errors
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

/// Owned copy of what a renderer needs.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub filter: PlatformFilter,
    pub visible: Vec<FeedItem>,
    pub total: usize,
    pub errors: Vec<FeedError>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Outcome of [`FeedHandle::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Applied { items: usize, errors: usize },
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

/// Shared handle to the feed state.
///
/// Loads are numbered; starting a load aborts the one in flight and only the
/// newest load may write its result. Lock order is `in_flight` then `inner`.
#[derive(Clone, Default)]
pub struct FeedHandle {
    inner: Arc<RwLock<FeedState>>,
    in_flight: Arc<Mutex<InFlight>>,
}

/// Newest load number and the task running it.
#[derive(Default)]
struct InFlight {
    generation: u64,
    task: Option<AbortHandle>,
}

impl FeedHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a new aggregation and install its result unless a newer load
    /// started meanwhile. The result lands even if the caller stops waiting.
    pub async fn load(&self, aggregator: Arc<Aggregator>) -> LoadStatus {
        let (generation, task) = {
            let mut flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            flight.generation += 1;
            let generation = flight.generation;
            self.write(|s| s.set_filter(PlatformFilter::All));

            let inner = Arc::clone(&self.inner);
            let in_flight = Arc::clone(&self.in_flight);
            let task = tokio::spawn(async move {
                let aggregation = aggregator.aggregate().await;
                apply_if_current(&inner, &in_flight, generation, aggregation)
            });
            if let Some(prev) = flight.task.replace(task.abort_handle()) {
                prev.abort();
            }
            (generation, task)
        };

        match task.await {
            Ok(status) => status,
            Err(e) if e.is_cancelled() => {
                tracing::debug!(target: "feed", generation, "load cancelled by a newer one");
                LoadStatus::Superseded
            }
            Err(e) => {
                tracing::error!(target: "feed", generation, error = %e, "aggregation task failed");
                apply_if_current(&self.inner, &self.in_flight, generation, Aggregation::default())
            }
        }
    }

    pub fn set_filter(&self, filter: PlatformFilter) {
        self.write(|s| s.set_filter(filter));
    }

    pub fn clear(&self) {
        self.write(FeedState::clear);
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let s = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        FeedSnapshot {
            filter: s.filter(),
            visible: s.visible().into_iter().cloned().collect(),
            total: s.result().len(),
            errors: s.errors().to_vec(),
            loaded_at: s.loaded_at(),
        }
    }

    fn write(&self, f: impl FnOnce(&mut FeedState)) {
        let mut s = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut s);
    }
}

fn apply_if_current(
    inner: &RwLock<FeedState>,
    in_flight: &Mutex<InFlight>,
    generation: u64,
    aggregation: Aggregation,
) -> LoadStatus {
    let mut flight = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    if flight.generation != generation {
        return LoadStatus::Superseded;
    }
    flight.task = None;

    let status = LoadStatus::Applied {
        items: aggregation.result.len(),
        errors: aggregation.errors.len(),
    };
    inner
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(aggregation);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Platform;

    fn agg(dates: &[(Platform, &str)]) -> Aggregation {
        let items = dates
            .iter()
            .map(|(p, d)| FeedItem::new(*p, *d, None, *d, "https://example.test", None))
            .collect();
        Aggregation {
            result: AggregateResult::from_unsorted(items),
            errors: vec![],
        }
    }

    #[test]
    fn filtering_never_mutates_or_reorders() {
        let mut s = FeedState::new();
        s.replace(agg(&[
            (Platform::Video, "2024-01-01"),
            (Platform::Microblog, "2024-03-01"),
            (Platform::Video, "2024-02-01"),
        ]));
        s.set_filter(PlatformFilter::Only(Platform::Video));
        let dates: Vec<_> = s.visible().iter().map(|i| i.date()).collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-01-01"]);
        assert_eq!(s.result().len(), 3);

        s.set_filter(PlatformFilter::All);
        assert_eq!(s.visible().len(), 3);
    }

    #[test]
    fn clear_resets_items_filter_and_errors() {
        let mut s = FeedState::new();
        let mut a = agg(&[(Platform::Microblog, "2024-01-01")]);
        a.errors.push(FeedError::configuration("YouTube", "blank"));
        s.replace(a);
        s.set_filter(PlatformFilter::Only(Platform::Microblog));
        s.clear();
        assert!(s.visible().is_empty());
        assert!(s.errors().is_empty());
        assert_eq!(s.filter(), PlatformFilter::All);
        assert!(s.loaded_at().is_none());
    }
}
