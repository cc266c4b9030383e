// tests/normalize_video.rs
use feed_aggregator::ingest::types::VideoSearchResponse;
use feed_aggregator::normalize::video::{self, UNKNOWN_CHANNEL, UNTITLED_VIDEO};
use feed_aggregator::{MissingDatePolicy, Platform};

fn fixture() -> VideoSearchResponse {
    let s = std::fs::read_to_string("tests/fixtures/youtube_search.json")
        .expect("missing tests/fixtures/youtube_search.json");
    serde_json::from_str(&s).expect("fixture parses")
}

#[test]
fn fixture_entries_map_in_order() {
    let out = video::normalize(&fixture(), MissingDatePolicy::Epoch);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|i| i.platform() == Platform::Video));

    assert_eq!(out[0].title(), "Build a REST API in Rust & Axum");
    assert_eq!(out[0].author(), Some("Rust Workshop"));
    assert_eq!(out[0].date(), "2024-06-03T15:00:00Z");
    assert_eq!(out[0].link(), "https://www.youtube.com/watch?v=vid001");
    assert_eq!(out[0].image(), Some("https://i.ytimg.com/vi/vid001/mqdefault.jpg"));

    assert_eq!(out[1].image(), Some("https://i.ytimg.com/vi/vid002/default.jpg"));
}

#[test]
fn missing_thumbnails_synthesize_from_id() {
    let out = video::normalize(&fixture(), MissingDatePolicy::Epoch);
    let img = out[2].image().expect("image always present for video");
    assert!(img.contains("abc123"), "got {img}");
    assert_eq!(img, video::synthesized_thumbnail("abc123"));
}

#[test]
fn every_item_has_populated_fields() {
    let out = video::normalize(&fixture(), MissingDatePolicy::Epoch);
    for it in &out {
        assert!(!it.title().is_empty());
        assert!(it.image().is_some_and(|s| !s.is_empty()));
        assert!(!it.link().is_empty());
        assert!(it.author().is_some_and(|s| !s.is_empty()));
        assert!(it.timestamp().is_some(), "date must parse: {}", it.date());
    }
    assert_eq!(out[2].title(), UNTITLED_VIDEO);
    assert_eq!(out[2].author(), Some(UNKNOWN_CHANNEL));
}

#[test]
fn empty_or_missing_items_yield_nothing() {
    for raw in [r#"{}"#, r#"{"items":[]}"#, r#"{"items":null}"#, r#"{"kind":"x"}"#] {
        let resp: VideoSearchResponse = serde_json::from_str(raw).unwrap();
        assert!(video::normalize(&resp, MissingDatePolicy::Epoch).is_empty(), "{raw}");
    }
}

// The "now" fallback moves undated items between loads; the epoch sentinel
// keeps them in the same place every time.
#[test]
fn missing_date_policy_controls_fallback() {
    let resp: VideoSearchResponse =
        serde_json::from_str(r#"{"items":[{"id":"nodate","snippet":{"title":"x"}}]}"#).unwrap();

    let a = video::normalize(&resp, MissingDatePolicy::Epoch);
    let b = video::normalize(&resp, MissingDatePolicy::Epoch);
    assert_eq!(a[0].date(), "1970-01-01T00:00:00Z");
    assert_eq!(a, b);

    let now = video::normalize(&resp, MissingDatePolicy::Now);
    let ts = now[0].timestamp().expect("now fallback parses");
    assert!((chrono::Utc::now() - ts).num_seconds().abs() < 5);
}

#[test]
fn odd_entries_do_not_cost_the_good_ones() {
    let resp: VideoSearchResponse = serde_json::from_str(
        r#"{"items":[
            {"id":{"videoId":"good1"},"snippet":{"title":"kept","thumbnails":{
                "medium":null,"default":{"url":"https://t/good1.jpg"}}}},
            {"id":42,"snippet":{"title":"numeric id"}},
            {"id":{"videoId":"bad"},"snippet":"not an object"},
            {"id":{"videoId":"good2"},"snippet":{"title":"also kept","thumbnails":{"medium":null}}}
        ]}"#,
    )
    .expect("one odd entry must not fail the payload");

    let out = video::normalize(&resp, MissingDatePolicy::Epoch);
    let titles: Vec<_> = out.iter().map(|i| i.title()).collect();
    assert_eq!(titles, vec!["kept", "also kept"]);
    assert_eq!(out[0].image(), Some("https://t/good1.jpg"));
    assert_eq!(
        out[1].image(),
        Some("https://img.youtube.com/vi/good2/mqdefault.jpg")
    );
}
