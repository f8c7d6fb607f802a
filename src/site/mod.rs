use crate::{
    page::PageDecorator,
    video::{CardStats, VideoCardEnricher},
};
use anyhow::{Context, Result};
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone)]
pub struct SiteOptions {
    /// Mirror the site here instead of rewriting pages in place
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SiteReport {
    pub pages: usize,
    pub changed: usize,
    pub failed_pages: usize,
    pub cards: CardStats,
}

struct ProcessedPage {
    html: String,
    changed: bool,
    stats: CardStats,
}

/// Runs the video card enricher and the page decorations over every page of
/// a built site.
pub struct SiteRunner {
    enricher: Option<VideoCardEnricher>,
    decorator: PageDecorator,
    options: SiteOptions,
}

impl SiteRunner {
    pub fn new(
        enricher: Option<VideoCardEnricher>,
        decorator: PageDecorator,
        options: SiteOptions,
    ) -> Self {
        Self {
            enricher,
            decorator,
            options,
        }
    }

    pub async fn run(&mut self, input: &Path) -> Result<SiteReport> {
        let input = input
            .canonicalize()
            .with_context(|| format!("Cannot read input path {}", input.display()))?;
        let is_dir = input.is_dir();

        let root = if is_dir {
            input.clone()
        } else {
            input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input.clone())
        };

        let output = match &self.options.output {
            Some(dir) if !self.options.dry_run => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
                Some(dir.canonicalize().with_context(|| {
                    format!("Failed to resolve output directory {}", dir.display())
                })?)
            }
            _ => None,
        };

        let files = if is_dir {
            collect_files(&root, output.as_deref())
        } else {
            vec![input.clone()]
        };

        info!("Processing {} files under {}", files.len(), root.display());

        let mut report = SiteReport::default();

        for path in files {
            let relative = path
                .strip_prefix(&root)
                .unwrap_or(path.as_path())
                .to_path_buf();
            let target = output.as_ref().map(|dir| dir.join(&relative));

            if !is_html(&path) {
                if let Some(target) = target {
                    if let Err(e) = copy_file(&path, &target) {
                        warn!("Failed to copy {}: {:#}", path.display(), e);
                    }
                }
                continue;
            }

            report.pages += 1;

            let page = match self.process_page(&path).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to process {}: {:#}", path.display(), e);
                    report.failed_pages += 1;
                    // the mirror still gets the page, unmodified
                    if let Some(target) = target {
                        if let Err(e) = copy_file(&path, &target) {
                            warn!("Failed to copy {}: {:#}", path.display(), e);
                        }
                    }
                    continue;
                }
            };

            report.cards.add(page.stats);
            if page.changed {
                report.changed += 1;
                info!(
                    "Updated {} ({} cards enriched, {} skipped, {} failed)",
                    relative.display(),
                    page.stats.enriched,
                    page.stats.skipped,
                    page.stats.failed
                );
            }

            if self.options.dry_run {
                continue;
            }

            let written = match target {
                Some(target) => write_atomic(&target, &page.html),
                None if page.changed => write_atomic(&path, &page.html),
                None => Ok(()),
            };

            if let Err(e) = written {
                warn!("Failed to write {}: {:#}", relative.display(), e);
                report.failed_pages += 1;
            }
        }

        info!(
            "Done: {} pages, {} changed, {} failed; cards: {} enriched, {} skipped, {} failed",
            report.pages,
            report.changed,
            report.failed_pages,
            report.cards.enriched,
            report.cards.skipped,
            report.cards.failed
        );

        Ok(report)
    }

    async fn process_page(&mut self, path: &Path) -> Result<ProcessedPage> {
        debug!("Processing page {}", path.display());

        let original = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let (html, stats) = match self.enricher.as_mut() {
            Some(enricher) => {
                let page = enricher.enrich_page(&original).await?;
                (page.html, page.stats)
            }
            None => (original.clone(), CardStats::default()),
        };

        let page_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let html = self.decorator.decorate(&html, &page_name)?;

        Ok(ProcessedPage {
            changed: html != original,
            html,
            stats,
        })
    }
}

fn collect_files(root: &Path, exclude: Option<&Path>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| exclude.is_none_or(|dir| !entry.path().starts_with(dir)))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn ensure_parent(path: &Path) -> Result<&Path> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    Ok(parent)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    ensure_parent(to)?;
    std::fs::copy(from, to)
        .with_context(|| format!("Failed to copy to {}", to.display()))?;
    Ok(())
}

/// Writes through a temp file in the same directory so readers never see a
/// half-written page.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = ensure_parent(path)?;

    let mut file = NamedTempFile::new_in(parent).context("Failed to create temp file")?;
    file.write_all(content.as_bytes())
        .context("Failed to write temp file")?;
    file.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CardConfig, PageConfig, YouTubeConfig},
        video::{MetadataSource, VideoId},
    };
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct StubSource;

    #[async_trait]
    impl MetadataSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn lookup(&self, id: &VideoId) -> Result<Option<crate::video::VideoDetails>> {
            Ok(Some(crate::video::VideoDetails {
                title: format!("Video {}", id),
                channel_title: "Acme".to_string(),
                duration: "PT3M20S".to_string(),
            }))
        }
    }

    const CARD_PAGE: &str = r#"<html><body><a class="video-card" data-youtube="https://youtu.be/XYZ789">Loading</a></body></html>"#;
    const PLAIN_PAGE: &str = "<html><body><p>Nothing to do</p></body></html>";

    fn runner(options: SiteOptions) -> SiteRunner {
        let enricher = VideoCardEnricher::new(
            Box::new(StubSource),
            CardConfig::default(),
            &YouTubeConfig::default(),
        );
        let decorator = PageDecorator::from_config(&PageConfig {
            terminal_titles: false,
            active_links: false,
            ..PageConfig::default()
        });
        SiteRunner::new(Some(enricher), decorator, options)
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("index.html"), PLAIN_PAGE).unwrap();
        fs::write(dir.path().join("guide/videos.html"), CARD_PAGE).unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();
        dir
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(Path::new("a/index.html")));
        assert!(is_html(Path::new("PAGE.HTM")));
        assert!(!is_html(Path::new("style.css")));
        assert!(!is_html(Path::new("html")));
    }

    #[tokio::test]
    async fn test_in_place_rewrites_only_changed_pages() {
        let dir = site();
        let report = runner(SiteOptions::default()).run(dir.path()).await.unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.changed, 1);
        assert_eq!(report.failed_pages, 0);
        assert_eq!(report.cards.enriched, 1);

        let page = fs::read_to_string(dir.path().join("guide/videos.html")).unwrap();
        assert!(page.contains("Video XYZ789"));
        assert!(page.contains("3:20"));
        assert_eq!(
            fs::read_to_string(dir.path().join("index.html")).unwrap(),
            PLAIN_PAGE
        );
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let dir = site();
        runner(SiteOptions::default()).run(dir.path()).await.unwrap();
        let first = fs::read_to_string(dir.path().join("guide/videos.html")).unwrap();

        let report = runner(SiteOptions::default()).run(dir.path()).await.unwrap();
        assert_eq!(report.changed, 0);
        assert_eq!(report.cards.skipped, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("guide/videos.html")).unwrap(),
            first
        );
    }

    #[tokio::test]
    async fn test_output_directory_mirrors_site() {
        let dir = site();
        let out = TempDir::new().unwrap();
        let options = SiteOptions {
            output: Some(out.path().to_path_buf()),
            dry_run: false,
        };

        let report = runner(options).run(dir.path()).await.unwrap();
        assert_eq!(report.changed, 1);

        assert_eq!(
            fs::read_to_string(dir.path().join("guide/videos.html")).unwrap(),
            CARD_PAGE
        );
        assert!(fs::read_to_string(out.path().join("guide/videos.html"))
            .unwrap()
            .contains("Video XYZ789"));
        assert_eq!(
            fs::read_to_string(out.path().join("index.html")).unwrap(),
            PLAIN_PAGE
        );
        assert_eq!(
            fs::read_to_string(out.path().join("style.css")).unwrap(),
            "body {}"
        );
    }

    #[tokio::test]
    async fn test_output_directory_keeps_unprocessable_pages() {
        let dir = site();
        fs::write(dir.path().join("legacy.html"), b"<p>\xE9</p>").unwrap();
        let out = TempDir::new().unwrap();
        let options = SiteOptions {
            output: Some(out.path().to_path_buf()),
            dry_run: false,
        };

        let report = runner(options).run(dir.path()).await.unwrap();
        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.cards.enriched, 1);
        assert_eq!(
            fs::read(out.path().join("legacy.html")).unwrap(),
            b"<p>\xE9</p>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = site();
        let options = SiteOptions {
            output: None,
            dry_run: true,
        };

        let report = runner(options).run(dir.path()).await.unwrap();
        assert_eq!(report.changed, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("guide/videos.html")).unwrap(),
            CARD_PAGE
        );
    }

    #[tokio::test]
    async fn test_single_file_input() {
        let dir = site();
        let file = dir.path().join("guide/videos.html");

        let report = runner(SiteOptions::default()).run(&file).await.unwrap();
        assert_eq!(report.pages, 1);
        assert!(fs::read_to_string(&file).unwrap().contains("Video XYZ789"));
    }

    #[tokio::test]
    async fn test_unreadable_page_does_not_stop_run() {
        let dir = site();
        fs::write(dir.path().join("broken.html"), [0xff, 0xfe, 0x00]).unwrap();

        let report = runner(SiteOptions::default()).run(dir.path()).await.unwrap();
        assert_eq!(report.pages, 3);
        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.cards.enriched, 1);
    }

    #[tokio::test]
    async fn test_decorations_without_enricher() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cli.html"), "<pre><code>ls</code></pre>").unwrap();

        let decorator = PageDecorator::from_config(&PageConfig::default());
        let mut runner = SiteRunner::new(None, decorator, SiteOptions::default());
        let report = runner.run(dir.path()).await.unwrap();

        assert_eq!(report.changed, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("cli.html")).unwrap(),
            r#"<pre data-title="ubuntu@server: ~"><code>ls</code></pre>"#
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let result = runner(SiteOptions::default())
            .run(&dir.path().join("nope"))
            .await;
        assert!(result.is_err());
    }
}
