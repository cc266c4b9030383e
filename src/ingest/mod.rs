// src/ingest/mod.rs
//! Source adapters and their raw payload types.

pub mod providers;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_loads_total", "Aggregation runs started.");
        describe_counter!(
            "feed_source_errors_total",
            "Source adapter failures (transport, status, timeout, embedded error)."
        );
        describe_counter!(
            "feed_items_total",
            "Normalized feed items produced, by platform."
        );
        describe_histogram!("feed_fetch_ms", "Source fetch time in milliseconds.");
        describe_gauge!(
            "feed_last_load_ts",
            "Unix ts when the last aggregation finished."
        );
    });
}
