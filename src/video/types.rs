use serde::Deserialize;

/// A placeholder card found while scanning a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCardRequest {
    /// Position among the page's matching elements, in document order
    pub ordinal: usize,
    pub raw_url: Option<String>,
    pub already_enriched: bool,
}

/// What a metadata source reports for a single video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub title: String,
    pub channel_title: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub raw_duration: String,
    pub thumbnail_url: String,
    pub duration: String,
}

// YouTube Data API v3 `videos.list` response, restricted to the parts we request.

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub snippet: Snippet,
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub channel_title: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    pub duration: String,
}

impl From<VideoItem> for VideoDetails {
    fn from(item: VideoItem) -> Self {
        Self {
            title: item.snippet.title,
            channel_title: item.snippet.channel_title,
            duration: item.content_details.duration,
        }
    }
}
