// src/normalize/mod.rs
//! Pure mappings from raw source payloads to [`FeedItem`]s.
//!
//! Normalizers never fail: missing collections give an empty Vec, missing
//! fields get the documented fallback or an explicit `None`.

pub mod microblog;
pub mod video;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::MissingDatePolicy;
use crate::feed::FeedItem;
use crate::ingest::types::RawPayload;

/// Normalize whichever payload shape an adapter returned.
pub fn normalize(payload: &RawPayload, missing_date: MissingDatePolicy) -> Vec<FeedItem> {
    match payload {
        RawPayload::Video(v) => video::normalize(v, missing_date),
        RawPayload::Microblog(m) => microblog::normalize(m, missing_date),
    }
}

/// Date string stored for records that carry none.
pub fn fallback_date(policy: MissingDatePolicy) -> String {
    let at = match policy {
        MissingDatePolicy::Epoch => DateTime::<Utc>::UNIX_EPOCH,
        MissingDatePolicy::Now => Utc::now(),
    };
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Trimmed, non-empty string or nothing.
pub(crate) fn present(s: Option<&String>) -> Option<&str> {
    s.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_fallback_is_fixed() {
        assert_eq!(fallback_date(MissingDatePolicy::Epoch), "1970-01-01T00:00:00Z");
        assert_eq!(
            fallback_date(MissingDatePolicy::Epoch),
            fallback_date(MissingDatePolicy::Epoch)
        );
    }

    #[test]
    fn now_fallback_is_recent() {
        let d = crate::feed::parse_feed_date(&fallback_date(MissingDatePolicy::Now)).unwrap();
        assert!((Utc::now() - d).num_seconds().abs() < 5);
    }
}
