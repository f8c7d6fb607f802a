use super::{id::VideoId, types::VideoDetails};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Human-readable name of the source
    fn name(&self) -> &'static str;

    /// Look up a single video. `Ok(None)` means the source knows no such video.
    async fn lookup(&self, id: &VideoId) -> Result<Option<VideoDetails>>;
}
