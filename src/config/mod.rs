use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub youtube: YouTubeConfig,
    pub cards: CardConfig,
    pub pages: PageConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct YouTubeConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    /// `{id}` is replaced with the video identifier
    pub thumbnail_url: String,
    /// 0 disables the request timeout
    pub timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://www.googleapis.com/youtube/v3/videos".to_string(),
            thumbnail_url: "https://img.youtube.com/vi/{id}/maxresdefault.jpg".to_string(),
            timeout_secs: 30,
        }
    }
}

impl YouTubeConfig {
    pub fn thumbnail_for(&self, id: &str) -> String {
        self.thumbnail_url.replace("{id}", id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CardConfig {
    pub selector: String,
    pub url_attribute: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            selector: ".video-card[data-youtube]".to_string(),
            url_attribute: "data-youtube".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PageConfig {
    pub terminal_titles: bool,
    pub terminal_title: String,
    pub active_links: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            terminal_titles: true,
            terminal_title: "ubuntu@server: ~".to_string(),
            active_links: true,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cards
            .selector
            .parse::<lol_html::Selector>()
            .map_err(|e| anyhow::anyhow!("Invalid card selector {:?}: {}", self.cards.selector, e))?;

        if self.cards.url_attribute.trim().is_empty() {
            anyhow::bail!("Card URL attribute must not be empty");
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            other => anyhow::bail!("Unknown logging format: {}", other),
        }

        Ok(())
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    /// The environment variable wins over the config file so the key never
    /// has to be written to disk.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.youtube.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}
