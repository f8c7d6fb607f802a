use crate::{
    utils::escape_html,
    video::{VideoCardRequest, VideoMetadata},
};
use anyhow::{Context, Result};
use lol_html::{element, html_content::ContentType, rewrite_str, RewriteStrSettings};

/// Marks a card that has already been rewritten.
pub const ENRICHED_ATTRIBUTE: &str = "data-video-enriched";

/// A finished card, ready to be written over the placeholder at `ordinal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub ordinal: usize,
    pub href: String,
    pub inner_html: String,
}

/// Collects every element matching `selector`, in document order.
pub fn scan_cards(html: &str, selector: &str, url_attribute: &str) -> Result<Vec<VideoCardRequest>> {
    let mut requests = Vec::new();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                requests.push(VideoCardRequest {
                    ordinal: requests.len(),
                    raw_url: el
                        .get_attribute(url_attribute)
                        .map(|url| url.trim().to_string())
                        .filter(|url| !url.is_empty()),
                    already_enriched: el.has_attribute(ENRICHED_ATTRIBUTE),
                });
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .context("Failed to scan page for video cards")?;

    Ok(requests)
}

pub fn render_card(ordinal: usize, href: &str, metadata: &VideoMetadata) -> RenderedCard {
    let inner_html = format!(
        r#"
<div class="video-thumb-container">
    <img class="video-thumbnail" src="{thumbnail}" alt="{title}">
    <div class="video-duration">{duration}</div>
</div>
<div class="video-info">
    <div class="video-title">{title}</div>
    <div class="video-channel">{channel}</div>
</div>
"#,
        thumbnail = escape_html(&metadata.thumbnail_url),
        duration = escape_html(&metadata.duration),
        title = escape_html(&metadata.title),
        channel = escape_html(&metadata.channel),
    );

    RenderedCard {
        ordinal,
        href: href.to_string(),
        inner_html,
    }
}

/// Writes `cards` over the matching placeholders. Elements without a rendered
/// card are left exactly as they were.
pub fn apply_cards(html: &str, selector: &str, cards: &[RenderedCard]) -> Result<String> {
    let mut ordinal = 0;

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                let current = ordinal;
                ordinal += 1;

                if let Some(card) = cards.iter().find(|card| card.ordinal == current) {
                    el.set_attribute("href", &card.href)?;
                    el.set_attribute("target", "_blank")?;
                    el.set_attribute(ENRICHED_ATTRIBUTE, "true")?;
                    el.set_inner_content(&card.inner_html, ContentType::Html);
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .context("Failed to rewrite video cards")
}
