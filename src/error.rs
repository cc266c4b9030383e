// src/error.rs
//! Error taxonomy for source loading and normalization.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// Required setting missing or blank; detected before any network call.
    #[error("{origin} is not configured: {reason}")]
    Configuration { origin: &'static str, reason: String },

    /// Transport failure, non-success status, timeout, or an error object
    /// embedded in an otherwise successful response.
    #[error("{origin} request failed: {cause}")]
    Source { origin: &'static str, cause: String },

    /// Raw payload could not be mapped. Normalizers degrade to empty output,
    /// so seeing this means a bug.
    #[error("{origin} payload could not be normalized: {reason}")]
    Normalization { origin: &'static str, reason: String },
}

impl FeedError {
    pub fn configuration(origin: &'static str, reason: impl Into<String>) -> Self {
        FeedError::Configuration {
            origin,
            reason: reason.into(),
        }
    }

    pub fn request(origin: &'static str, cause: impl Into<String>) -> Self {
        FeedError::Source {
            origin,
            cause: cause.into(),
        }
    }

    /// Name of the source adapter that produced the error.
    pub fn origin(&self) -> &'static str {
        match self {
            FeedError::Configuration { origin, .. }
            | FeedError::Source { origin, .. }
            | FeedError::Normalization { origin, .. } => origin,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Configuration { .. } => "configuration",
            FeedError::Source { .. } => "source",
            FeedError::Normalization { .. } => "normalization",
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, FeedError::Configuration { .. })
    }

    /// Remediation steps shown next to the message.
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            FeedError::Configuration { .. } => &[
                "Set `credential` in config/feed.toml or export YOUTUBE_API_KEY",
                "Make sure the key is not blank",
            ],
            FeedError::Source { .. } => &[
                "Check that the API key is correct",
                "Check that the YouTube Data API v3 is enabled for the key",
                "Check that the internet connection is working",
            ],
            FeedError::Normalization { .. } => &["Report this payload; it should never fail to map"],
        }
    }

    /// User-facing form of the error.
    pub fn notice(&self) -> Notice {
        Notice {
            source: self.origin(),
            kind: self.kind(),
            message: self.to_string(),
            hints: self.hints().to_vec(),
        }
    }
}

/// What the renderer shows when a critical source fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub source: &'static str,
    pub kind: &'static str,
    pub message: String,
    pub hints: Vec<&'static str>,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f)?;
        writeln!(f, "Please check:")?;
        for (i, h) in self.hints.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, h)?;
        }
        Ok(())
    }
}
