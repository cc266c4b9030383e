// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod metrics;
pub mod normalize;
pub mod state;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{Aggregation, Aggregator};
pub use crate::api::router;
pub use crate::config::{FeedConfig, MissingDatePolicy};
pub use crate::error::FeedError;
pub use crate::feed::{AggregateResult, FeedItem, Platform, PlatformFilter};
pub use crate::state::{FeedHandle, FeedState};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a compact tracing subscriber. `RUST_LOG` wins; otherwise
/// `feed=info,feed_aggregator=info,warn`. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed=info,feed_aggregator=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
