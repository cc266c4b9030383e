// src/ingest/types.rs
//! Raw, source-specific payload shapes and the adapter trait.
//!
//! Every field is optional so that partial or oddly shaped documents still
//! deserialize; the normalizers decide what a missing field means.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FeedError;

/// Search API response (`items[].snippet`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSearchResponse {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub items: Option<Vec<VideoEntry>>,
    /// Present when the API reports a failure inside a 200 response.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoEntry {
    #[serde(default)]
    pub id: Option<VideoId>,
    #[serde(default)]
    pub snippet: Option<Snippet>,
}

/// Search results carry `{"kind": .., "videoId": ..}`; other endpoints use a
/// bare string id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VideoId {
    Plain(String),
    Resource {
        #[serde(rename = "videoId", default)]
        video_id: Option<String>,
    },
    /// Numbers, arrays, booleans: nothing a link can be built from.
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    /// Keyed by resolution tier: "default", "medium", "high", ...
    #[serde(default)]
    pub thumbnails: Option<HashMap<String, Option<Thumbnail>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

/// Static sample document (`data[]`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MicroblogPayload {
    #[serde(default)]
    pub data: Option<Vec<MicroblogRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MicroblogRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author: Option<MicroblogAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MicroblogAuthor {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

// One entry of an unexpected shape drops that entry, not the whole page.
fn lenient_entries<'de, D>(de: D) -> Result<Option<Vec<VideoEntry>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(values) = Option::<Vec<serde_json::Value>>::deserialize(de)? else {
        return Ok(None);
    };
    let entries = values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<VideoEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(target: "feed", index = idx, error = %e, "malformed video entry skipped");
                None
            }
        })
        .collect();
    Ok(Some(entries))
}

// Sample documents sometimes carry numeric ids.
fn string_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        S(String),
        N(serde_json::Number),
    }
    Ok(Option::<Id>::deserialize(de)?.map(|id| match id {
        Id::S(s) => s,
        Id::N(n) => n.to_string(),
    }))
}

/// Whatever an adapter fetched, tagged by shape.
#[derive(Debug, Clone)]
pub enum RawPayload {
    Video(VideoSearchResponse),
    Microblog(MicroblogPayload),
}

impl RawPayload {
    /// Number of top-level entries, before normalization.
    pub fn entry_count(&self) -> usize {
        match self {
            RawPayload::Video(v) => v.items.as_ref().map_or(0, Vec::len),
            RawPayload::Microblog(m) => m.data.as_ref().map_or(0, Vec::len),
        }
    }
}

/// One source of raw feed data.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self) -> Result<RawPayload, FeedError>;

    fn name(&self) -> &'static str;

    /// Critical sources get their failures reported to the user; the rest are
    /// logged and treated as empty.
    fn critical(&self) -> bool;
}
