use regex::Regex;
use std::{fmt, sync::LazyLock};

static WATCH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/watch\?v=([^&#\s]+)").unwrap());

static SHORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.be/([^?&#/\s]+)").unwrap());

/// Identifier of a video on the platform, as found in a card's source URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Accepts `youtube.com/watch?v=<id>` and `youtu.be/<id>`, in that order.
    pub fn from_url(url: &str) -> Option<Self> {
        [&*WATCH_PATTERN, &*SHORT_PATTERN]
            .iter()
            .find_map(|pattern| pattern.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
