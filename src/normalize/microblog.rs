// src/normalize/microblog.rs
use crate::config::MissingDatePolicy;
use crate::feed::{FeedItem, Platform};
use crate::ingest::types::{MicroblogPayload, MicroblogRecord};

use super::{fallback_date, present};

pub const UNTITLED_POST: &str = "Untitled Post";

const BASE: &str = "https://twitter.com";

/// Canonical status URL; degrades to the shortest URL the known parts allow.
pub fn status_url(username: Option<&str>, id: Option<&str>) -> String {
    match (username, id) {
        (Some(u), Some(id)) => format!("{BASE}/{u}/status/{id}"),
        (None, Some(id)) => format!("{BASE}/i/status/{id}"),
        (Some(u), None) => format!("{BASE}/{u}"),
        (None, None) => format!("{BASE}/"),
    }
}

pub fn normalize(payload: &MicroblogPayload, missing_date: MissingDatePolicy) -> Vec<FeedItem> {
    payload
        .data
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|rec| normalize_record(rec, missing_date))
        .collect()
}

fn normalize_record(rec: &MicroblogRecord, missing_date: MissingDatePolicy) -> FeedItem {
    let author = rec.author.as_ref();
    let username = author.and_then(|a| present(a.username.as_ref()));
    let avatar = author.and_then(|a| a.profile_image_url.clone());

    let title = present(rec.text.as_ref()).unwrap_or(UNTITLED_POST);
    let date = present(rec.created_at.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_date(missing_date));

    FeedItem::new(
        Platform::Microblog,
        title,
        avatar,
        date,
        status_url(username, present(rec.id.as_ref())),
        username.map(str::to_string),
    )
}
