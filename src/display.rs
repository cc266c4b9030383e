// src/display.rs
//! Text helpers for renderers: relative dates and plain-text cards.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::feed::{parse_feed_date, FeedItem, Platform};

/// "Today", "Yesterday", "N days ago" within a week, else "Jun 1, 2024".
/// Unparseable dates are returned as-is.
pub fn relative_date(date: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_feed_date(date) else {
        return date.to_string();
    };
    match (now - at).num_days().abs() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        _ => at.format("%b %-d, %Y").to_string(),
    }
}

/// Plain-text card used by the demo binary.
pub fn card_text(item: &FeedItem, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", item.platform(), relative_date(item.date(), now));
    let _ = writeln!(out, "  {}", item.title());
    if let Some(author) = item.author() {
        let _ = writeln!(out, "  @{author}");
    }
    // Microblog images are avatars, not content.
    match (item.platform(), item.image()) {
        (Platform::Video, Some(img)) => {
            let _ = writeln!(out, "  image: {img}");
        }
        (Platform::Video, None) => {
            let _ = writeln!(out, "  image: (none)");
        }
        (Platform::Microblog, _) => {}
    }
    let _ = writeln!(out, "  View on {} -> {}", item.platform(), item.link());
    out
}
