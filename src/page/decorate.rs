use crate::{config::PageConfig, utils::add_class};
use anyhow::{Context, Result};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Static replacements for the page script's terminal-title and
/// active-link initializers.
pub struct PageDecorator {
    terminal_title: Option<String>,
    active_links: bool,
}

impl PageDecorator {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            terminal_title: config
                .terminal_titles
                .then(|| config.terminal_title.clone()),
            active_links: config.active_links,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.terminal_title.is_some() || self.active_links
    }

    /// `page_name` is the last path segment of the page, e.g. `install.html`.
    pub fn decorate(&self, html: &str, page_name: &str) -> Result<String> {
        if !self.is_enabled() {
            return Ok(html.to_string());
        }

        let open_sections = if self.active_links {
            sections_to_open(html, page_name)?
        } else {
            HashSet::new()
        };

        let mut handlers = Vec::new();
        let mut section = 0;

        if let Some(title) = &self.terminal_title {
            handlers.push(element!("pre", move |el| {
                if !el.has_attribute("data-title") {
                    el.set_attribute("data-title", title)?;
                }
                Ok(())
            }));
        }

        if self.active_links {
            handlers.push(element!(".nav-link", |el| {
                if el.get_attribute("href").as_deref() == Some(page_name) {
                    let classes = add_class(el.get_attribute("class").as_deref(), "active");
                    el.set_attribute("class", &classes)?;
                }
                Ok(())
            }));

            handlers.push(element!(".nav-section", |el| {
                if open_sections.contains(&section) {
                    let classes = add_class(el.get_attribute("class").as_deref(), "open");
                    el.set_attribute("class", &classes)?;
                }
                section += 1;
                Ok(())
            }));
        }

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: handlers,
                ..RewriteStrSettings::default()
            },
        )
        .context("Failed to decorate page")
    }
}

/// Ordinals (in document order) of the `.nav-section` elements that are the
/// closest section ancestor of a link to the current page.
fn sections_to_open(html: &str, page_name: &str) -> Result<HashSet<usize>> {
    let section_selector = Selector::parse(".nav-section")
        .map_err(|e| anyhow::anyhow!("Invalid selector: {:?}", e))?;
    let link_selector =
        Selector::parse(".nav-link").map_err(|e| anyhow::anyhow!("Invalid selector: {:?}", e))?;

    let document = Html::parse_document(html);
    let sections: Vec<_> = document.select(&section_selector).map(|s| s.id()).collect();

    let open = document
        .select(&link_selector)
        .filter(|link| link.value().attr("href") == Some(page_name))
        .filter_map(|link| {
            link.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().classes().any(|c| c == "nav-section"))
        })
        .filter_map(|section| sections.iter().position(|id| *id == section.id()))
        .collect();

    Ok(open)
}
