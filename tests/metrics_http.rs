// tests/metrics_http.rs
// Own test binary: installs the process-wide Prometheus recorder.
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt as _;

use feed_aggregator::metrics::Metrics;
use feed_aggregator::{Aggregator, FeedConfig};

#[tokio::test]
async fn metrics_exposed_after_aggregation() {
    let metrics = Metrics::init().expect("recorder");

    let cfg = FeedConfig {
        static_source: "tests/fixtures/twitter_sample.json".into(),
        ..FeedConfig::default()
    };
    let out = Aggregator::from_config(&cfg).aggregate().await;
    assert_eq!(out.result.len(), 2);

    let app = metrics.router::<()>();
    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("feed_loads_total"), "{text}");
    assert!(text.contains("feed_items_total"), "{text}");
    assert!(text.contains("feed_fetch_ms"), "{text}");
}
