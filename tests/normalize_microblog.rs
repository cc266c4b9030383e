// tests/normalize_microblog.rs
use feed_aggregator::ingest::types::MicroblogPayload;
use feed_aggregator::normalize::microblog::{self, UNTITLED_POST};
use feed_aggregator::{MissingDatePolicy, Platform};

fn parse(json: &str) -> MicroblogPayload {
    serde_json::from_str(json).expect("payload parses")
}

#[test]
fn records_map_one_to_one() {
    let s = std::fs::read_to_string("tests/fixtures/twitter_sample.json").expect("fixture");
    let out = microblog::normalize(&parse(&s), MissingDatePolicy::Epoch);
    assert_eq!(out.len(), 2);

    let first = &out[0];
    assert_eq!(first.platform(), Platform::Microblog);
    assert_eq!(first.title(), "Early post");
    assert_eq!(first.image(), Some("https://img.test/early.png"));
    assert_eq!(first.date(), "2024-01-01");
    assert_eq!(first.link(), "https://twitter.com/early/status/2001");
    assert_eq!(first.author(), Some("early"));
}

#[test]
fn absent_author_and_image_are_marked_not_defaulted() {
    let out = microblog::normalize(
        &parse(
            r#"{"data":[
                {"id":"1","text":"no author","created_at":"2024-02-02"},
                {"id":"2","text":"blank avatar","created_at":"2024-02-02",
                 "author":{"username":"  ","profile_image_url":""}}
            ]}"#,
        ),
        MissingDatePolicy::Epoch,
    );
    for it in &out {
        assert_eq!(it.author(), None);
        assert_eq!(it.image(), None);
    }
    assert_eq!(out[0].link(), "https://twitter.com/i/status/1");
}

#[test]
fn sparse_record_still_normalizes() {
    let out = microblog::normalize(&parse(r#"{"data":[{}]}"#), MissingDatePolicy::Epoch);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title(), UNTITLED_POST);
    assert_eq!(out[0].date(), "1970-01-01T00:00:00Z");
    assert_eq!(out[0].link(), "https://twitter.com/");
}

#[test]
fn empty_or_missing_data_yields_nothing() {
    for raw in [r#"{}"#, r#"{"data":[]}"#, r#"{"data":null}"#, r#"{"meta":{"result_count":0}}"#] {
        assert!(microblog::normalize(&parse(raw), MissingDatePolicy::Epoch).is_empty(), "{raw}");
    }
}
