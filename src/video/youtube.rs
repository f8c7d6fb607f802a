use super::{
    id::VideoId,
    source::MetadataSource,
    types::{VideoDetails, VideoListResponse},
};
use crate::config::YouTubeConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

const PARTS: &str = "snippet,contentDetails";

/// `videos.list` endpoint of the YouTube Data API.
pub struct YouTubeDataApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl YouTubeDataApi {
    pub fn new(config: &YouTubeConfig, api_key: String) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
        })
    }

    fn request_url(&self, id: &VideoId) -> Result<Url> {
        Url::parse_with_params(
            &self.api_url,
            &[
                ("id", id.as_str()),
                ("part", PARTS),
                ("key", self.api_key.as_str()),
            ],
        )
        .with_context(|| format!("Invalid API URL: {}", self.api_url))
    }
}

/// Parses a `videos.list` body. A body without `items` is an error, an empty
/// `items` array is not.
pub fn parse_response(body: &str) -> Result<Option<VideoDetails>> {
    let response: VideoListResponse =
        serde_json::from_str(body).context("Failed to parse video metadata")?;

    Ok(response.items.into_iter().next().map(VideoDetails::from))
}

#[async_trait]
impl MetadataSource for YouTubeDataApi {
    fn name(&self) -> &'static str {
        "youtube-data-api"
    }

    async fn lookup(&self, id: &VideoId) -> Result<Option<VideoDetails>> {
        debug!("Fetching metadata for video {}", id);

        let response = self
            .client
            .get(self.request_url(id)?)
            .send()
            .await
            // the request URL carries the API key
            .map_err(|e| e.without_url())
            .context("Failed to fetch video metadata")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Video metadata request failed: HTTP {}",
                response.status()
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read video metadata")?;

        parse_response(&body)
    }
}
