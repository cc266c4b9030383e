// src/feed/mod.rs
//! Common feed schema shared by every source: platforms, normalized items,
//! the sorted aggregate and the platform filter.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a feed item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "YouTube")]
    Video,
    #[serde(rename = "Twitter")]
    Microblog,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Video, Platform::Microblog];

    /// Display label used on cards and in JSON.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Video => "YouTube",
            Platform::Microblog => "Twitter",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}' (expected all, video/youtube or microblog/twitter)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" | "youtube" => Ok(Platform::Video),
            "microblog" | "twitter" => Ok(Platform::Microblog),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Active platform selection. `All` is the reset state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn matches(&self, item: &FeedItem) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(p) => item.platform == *p,
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFilter::All => f.write_str("all"),
            PlatformFilter::Only(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PlatformFilter::All);
        }
        s.parse().map(PlatformFilter::Only)
    }
}

impl Serialize for PlatformFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One normalized, platform-agnostic record.
///
/// Built only through [`FeedItem::new`], which turns blank optional values into
/// explicit `None` markers. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    platform: Platform,
    title: String,
    image: Option<String>,
    date: String,
    link: String,
    author: Option<String>,
}

impl FeedItem {
    pub fn new(
        platform: Platform,
        title: impl Into<String>,
        image: Option<String>,
        date: impl Into<String>,
        link: impl Into<String>,
        author: Option<String>,
    ) -> Self {
        Self {
            platform,
            title: title.into(),
            image: image.and_then(non_blank),
            date: date.into(),
            link: link.into(),
            author: author.and_then(non_blank),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Parsed timestamp, `None` if the stored date string is not a date.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_feed_date(&self.date)
    }
}

/// Trim and reject values that mean "nothing here".
pub(crate) fn non_blank(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("undefined") || t.eq_ignore_ascii_case("null") {
        None
    } else if t.len() == s.len() {
        Some(s)
    } else {
        Some(t.to_string())
    }
}

/// Parse the date formats the sources are known to emit:
/// RFC 3339, naive ISO datetimes (assumed UTC), plain dates, RFC 2822 and the
/// legacy microblog format `Wed Oct 10 20:19:24 +0000 2018`.
pub fn parse_feed_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Items of one aggregation run, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult(Vec<FeedItem>);

impl AggregateResult {
    /// Sort `items` by date descending. The sort is stable, so equal dates keep
    /// the order they arrived in; undated items go last.
    pub fn from_unsorted(mut items: Vec<FeedItem>) -> Self {
        items.sort_by_cached_key(|it| std::cmp::Reverse(it.timestamp()));
        Self(items)
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeedItem> {
        self.0.iter()
    }

    /// Matching subsequence, in stored order.
    pub fn filtered(&self, filter: PlatformFilter) -> Vec<&FeedItem> {
        self.0.iter().filter(|it| filter.matches(it)).collect()
    }

    pub fn count_for(&self, platform: Platform) -> usize {
        self.0.iter().filter(|it| it.platform == platform).count()
    }
}

impl<'a> IntoIterator for &'a AggregateResult {
    type Item = &'a FeedItem;
    type IntoIter = std::slice::Iter<'a, FeedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
