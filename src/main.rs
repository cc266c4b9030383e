//! Feed aggregator service: binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, and metrics.

use feed_aggregator::{api, metrics::Metrics, Aggregator, FeedConfig};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    feed_aggregator::init_tracing();

    let cfg = FeedConfig::load_default()?;
    if !cfg.has_credential() {
        tracing::warn!(target: "feed", "no video API credential configured; only sample data will load");
    }

    let aggregator = Aggregator::from_config(&cfg);
    tracing::info!(
        target: "feed",
        sources = ?aggregator.adapter_names(),
        query = %cfg.search_query,
        max_results = cfg.max_results,
        "feed aggregator configured"
    );

    let mut router = api::router(api::AppState::new(aggregator));
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "prometheus recorder not installed; /metrics disabled"),
    }

    Ok(router.into())
}
