// src/normalize/video.rs
use std::borrow::Cow;

use crate::config::MissingDatePolicy;
use crate::feed::{FeedItem, Platform};
use crate::ingest::types::{VideoEntry, VideoId, VideoSearchResponse};

use super::{fallback_date, present};

pub const UNTITLED_VIDEO: &str = "Untitled Video";
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";

/// Preferred thumbnail tiers, best first.
const THUMBNAIL_TIERS: [&str; 2] = ["medium", "default"];

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Predictable thumbnail location for a video id.
pub fn synthesized_thumbnail(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/mqdefault.jpg")
}

pub fn normalize(resp: &VideoSearchResponse, missing_date: MissingDatePolicy) -> Vec<FeedItem> {
    let Some(items) = resp.items.as_ref() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(items.len());
    for (idx, entry) in items.iter().enumerate() {
        match normalize_entry(entry, missing_date) {
            Some(item) => out.push(item),
            None => tracing::debug!(target: "feed", index = idx, "video entry without id skipped"),
        }
    }
    out
}

fn normalize_entry(entry: &VideoEntry, missing_date: MissingDatePolicy) -> Option<FeedItem> {
    let id = video_id(entry)?;
    let snippet = entry.snippet.as_ref();

    let title = snippet
        .and_then(|s| present(s.title.as_ref()))
        .map(decode)
        .unwrap_or_else(|| UNTITLED_VIDEO.to_string());
    let author = snippet
        .and_then(|s| present(s.channel_title.as_ref()))
        .map(decode)
        .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string());
    let date = snippet
        .and_then(|s| present(s.published_at.as_ref()))
        .map(str::to_string)
        .unwrap_or_else(|| fallback_date(missing_date));

    Some(FeedItem::new(
        Platform::Video,
        title,
        Some(thumbnail(entry, id)),
        date,
        watch_url(id),
        Some(author),
    ))
}

/// Explicit `id.videoId` first, then a bare string id.
fn video_id(entry: &VideoEntry) -> Option<&str> {
    match entry.id.as_ref()? {
        VideoId::Resource { video_id } => present(video_id.as_ref()),
        VideoId::Plain(s) => Some(s.trim()).filter(|s| !s.is_empty()),
        VideoId::Other(_) => None,
    }
}

fn thumbnail(entry: &VideoEntry, id: &str) -> String {
    entry
        .snippet
        .as_ref()
        .and_then(|s| s.thumbnails.as_ref())
        .and_then(|thumbs| {
            THUMBNAIL_TIERS
                .iter()
                .find_map(|tier| thumbs.get(*tier)?.as_ref().and_then(|t| present(t.url.as_ref())))
        })
        .map(str::to_string)
        .unwrap_or_else(|| synthesized_thumbnail(id))
}

// Titles come back HTML-escaped ("Rust &amp; WebAssembly").
fn decode(s: &str) -> String {
    match html_escape::decode_html_entities(s) {
        Cow::Borrowed(b) => b.to_string(),
        Cow::Owned(o) => o,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> VideoSearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn prefers_medium_then_default_thumbnail() {
        let resp = parse(
            r#"{"items":[
                {"id":{"videoId":"a"},"snippet":{"thumbnails":{
                    "default":{"url":"https://t/d.jpg"},"medium":{"url":"https://t/m.jpg"}}}},
                {"id":{"videoId":"b"},"snippet":{"thumbnails":{"default":{"url":"https://t/d2.jpg"}}}}
            ]}"#,
        );
        let out = normalize(&resp, MissingDatePolicy::Epoch);
        assert_eq!(out[0].image(), Some("https://t/m.jpg"));
        assert_eq!(out[1].image(), Some("https://t/d2.jpg"));
    }

    #[test]
    fn plain_string_id_is_accepted() {
        let resp = parse(r#"{"items":[{"id":"xyz","snippet":{"title":"T"}}]}"#);
        let out = normalize(&resp, MissingDatePolicy::Epoch);
        assert_eq!(out[0].link(), "https://www.youtube.com/watch?v=xyz");
    }

    #[test]
    fn entries_without_any_id_are_skipped() {
        let resp = parse(
            r#"{"items":[{"snippet":{"title":"orphan"}},{"id":{"kind":"youtube#channel"}},{"id":"ok"}]}"#,
        );
        let out = normalize(&resp, MissingDatePolicy::Epoch);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title(), UNTITLED_VIDEO);
    }

    #[test]
    fn html_entities_are_decoded() {
        let resp = parse(
            r#"{"items":[{"id":"q","snippet":{"title":"Rust &amp; WASM &#39;24","channelTitle":"Tom &quot;T&quot;"}}]}"#,
        );
        let out = normalize(&resp, MissingDatePolicy::Epoch);
        assert_eq!(out[0].title(), "Rust & WASM '24");
        assert_eq!(out[0].author(), Some("Tom \"T\""));
    }
}
