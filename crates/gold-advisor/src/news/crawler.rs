//! Paging Crawler
//!
//! Walks a `NewsSource` page by page until enough unique items are
//! collected, then optionally enriches the first few with article details.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::NewsSource;
use crate::model::NewsItem;

/// Detail titles that name the channel rather than the article
const GENERIC_TITLES: &[&str] = &["黄金频道", "汇通财经"];

/// Crawl pacing
#[derive(Clone, Debug)]
pub struct CrawlerConfig {
    /// Pause between list pages
    pub page_delay: Duration,
    /// Pause between detail requests
    pub detail_delay: Duration,
    /// Hard stop regardless of target
    pub max_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(2),
            detail_delay: Duration::from_secs(1),
            max_pages: 100,
        }
    }
}

impl CrawlerConfig {
    /// No pauses (tests and mock sources)
    pub fn unthrottled() -> Self {
        Self {
            page_delay: Duration::ZERO,
            detail_delay: Duration::ZERO,
            ..Default::default()
        }
    }
}

pub struct NewsCrawler {
    source: Arc<dyn NewsSource>,
    config: CrawlerConfig,
}

impl NewsCrawler {
    pub fn new(source: Arc<dyn NewsSource>, config: CrawlerConfig) -> Self {
        Self { source, config }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Collect up to `target` unique items starting at page 1
    ///
    /// Stops early at an empty or failed page.
    pub async fn crawl_pages(&self, target: usize) -> Vec<NewsItem> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        tracing::info!("Crawling {} for {} items", self.source.name(), target);

        let mut page = 1;
        while collected.len() < target && page <= self.config.max_pages {
            let items = match self.source.fetch_page(page).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Page {} failed: {}", page, e);
                    break;
                }
            };
            if items.is_empty() {
                tracing::info!("Page {} is empty, stopping", page);
                break;
            }

            let before = collected.len();
            collected.extend(items.into_iter().filter(|item| seen.insert(item.url.clone())));
            tracing::info!(
                "Page {}: {} new items, {} total",
                page,
                collected.len() - before,
                collected.len()
            );

            page += 1;
            if collected.len() < target && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }
        }

        collected.truncate(target);
        tracing::info!("Crawl finished with {} items", collected.len());
        collected
    }

    /// Crawl `target` items and fetch details for the first `max_details`
    ///
    /// Items without details (skipped or failed) keep empty content.
    pub async fn crawl_with_details(&self, target: usize, max_details: usize) -> Vec<NewsItem> {
        let mut items = self.crawl_pages(target).await;
        let detail_count = max_details.min(items.len());

        for (i, item) in items.iter_mut().take(detail_count).enumerate() {
            tracing::debug!("Fetching detail {}/{}: {}", i + 1, detail_count, item.url);

            match self.source.fetch_detail(&item.url).await {
                Ok(detail) => {
                    let title = detail.title.trim();
                    if !title.is_empty() && !GENERIC_TITLES.contains(&title) {
                        item.title = title.to_string();
                    }
                    item.content = detail.content;
                    item.publish_time = detail.publish_time;
                    item.author = detail.author;
                    item.tags = detail.tags;
                }
                Err(e) => tracing::warn!("Detail for {} failed: {}", item.url, e),
            }

            if i + 1 < detail_count && !self.config.detail_delay.is_zero() {
                tokio::time::sleep(self.config.detail_delay).await;
            }
        }

        items
    }
}
