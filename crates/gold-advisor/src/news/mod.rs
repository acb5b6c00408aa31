//! News Sources
//!
//! Abstractions and implementations for gold-news providers, plus the
//! paging crawler and the JSON batch store.

mod crawler;
mod fx678;
mod mock;
pub mod store;

pub use crawler::{CrawlerConfig, NewsCrawler};
pub use fx678::{Fx678Config, Fx678Parser, Fx678Source};
pub use mock::MockNewsSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NewsDetail, NewsItem};

/// News source trait (Strategy pattern)
///
/// Implement this for each site that publishes gold news.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Items listed on a 1-based list page; empty past the last page
    async fn fetch_page(&self, page: u32) -> Result<Vec<NewsItem>>;

    /// Full article behind a list item
    async fn fetch_detail(&self, url: &str) -> Result<NewsDetail>;

    /// Source name
    fn name(&self) -> &str;
}
