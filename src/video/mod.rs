mod duration;
mod id;
mod source;
mod types;
mod youtube;

pub use id::VideoId;
pub use source::MetadataSource;
pub use types::{VideoCardRequest, VideoDetails, VideoMetadata};
pub use youtube::YouTubeDataApi;

use crate::{
    config::{CardConfig, YouTubeConfig},
    page::{apply_cards, render_card, scan_cards, RenderedCard},
};
use anyhow::Result;
use duration::format_duration;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Per-card outcome counts for one or more pages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CardStats {
    pub enriched: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CardStats {
    pub fn add(&mut self, other: CardStats) {
        self.enriched += other.enriched;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Debug)]
pub struct EnrichedPage {
    pub html: String,
    pub stats: CardStats,
}

enum CardOutcome {
    Enriched(RenderedCard),
    Skipped,
    Failed,
}

/// Rewrites placeholder video cards using metadata from a [`MetadataSource`].
///
/// Cards are handled one at a time in document order. A failure on one card is
/// logged and leaves that card untouched; it never affects its siblings.
/// Successful lookups are cached by identifier for the enricher's lifetime.
pub struct VideoCardEnricher {
    source: Box<dyn MetadataSource>,
    cards: CardConfig,
    youtube: YouTubeConfig,
    force: bool,
    cache: HashMap<VideoId, VideoMetadata>,
}

impl VideoCardEnricher {
    pub fn new(source: Box<dyn MetadataSource>, cards: CardConfig, youtube: &YouTubeConfig) -> Self {
        info!("Video card enricher initialized - using {}", source.name());

        Self {
            source,
            cards,
            youtube: youtube.clone(),
            force: false,
            cache: HashMap::new(),
        }
    }

    /// Re-enrich cards that already carry the enrichment marker.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub async fn enrich_page(&mut self, html: &str) -> Result<EnrichedPage> {
        let requests = scan_cards(html, &self.cards.selector, &self.cards.url_attribute)?;
        let mut stats = CardStats::default();

        if requests.is_empty() {
            return Ok(EnrichedPage {
                html: html.to_string(),
                stats,
            });
        }

        debug!("Found {} video cards", requests.len());

        let mut rendered = Vec::new();
        for request in &requests {
            match self.enrich_card(request).await {
                CardOutcome::Enriched(card) => {
                    stats.enriched += 1;
                    rendered.push(card);
                }
                CardOutcome::Skipped => stats.skipped += 1,
                CardOutcome::Failed => stats.failed += 1,
            }
        }

        let html = if rendered.is_empty() {
            html.to_string()
        } else {
            apply_cards(html, &self.cards.selector, &rendered)?
        };

        Ok(EnrichedPage { html, stats })
    }

    async fn enrich_card(&mut self, request: &VideoCardRequest) -> CardOutcome {
        if request.already_enriched && !self.force {
            return CardOutcome::Skipped;
        }

        let Some(url) = request.raw_url.as_deref() else {
            return CardOutcome::Skipped;
        };

        let Some(id) = VideoId::from_url(url) else {
            return CardOutcome::Skipped;
        };

        match self.resolve(&id).await {
            Ok(Some(metadata)) => {
                CardOutcome::Enriched(render_card(request.ordinal, url, &metadata))
            }
            Ok(None) => CardOutcome::Skipped,
            Err(e) => {
                warn!("YouTube API error for {}: {:#}", url, e);
                CardOutcome::Failed
            }
        }
    }

    /// Cache first, then the source. Only successful lookups are cached.
    async fn resolve(&mut self, id: &VideoId) -> Result<Option<VideoMetadata>> {
        if let Some(metadata) = self.cache.get(id) {
            debug!(
                "Using cached metadata for video {} ({})",
                metadata.id, metadata.raw_duration
            );
            return Ok(Some(metadata.clone()));
        }

        let Some(details) = self.source.lookup(id).await? else {
            return Ok(None);
        };

        let metadata = VideoMetadata {
            id: id.to_string(),
            thumbnail_url: self.youtube.thumbnail_for(id.as_str()),
            duration: format_duration(&details.duration)?,
            raw_duration: details.duration,
            title: details.title,
            channel: details.channel_title,
        };

        self.cache.insert(id.clone(), metadata.clone());
        Ok(Some(metadata))
    }
}
