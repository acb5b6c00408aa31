//! Mock News Source
//!
//! For testing and demo purposes. Serves a fixed set of gold headlines
//! in pages, with synthetic article bodies.

use async_trait::async_trait;

use super::NewsSource;
use crate::error::{AdvisorError, Result};
use crate::model::{NewsDetail, NewsItem};

const DEFAULT_PAGE_SIZE: usize = 5;

const HEADLINES: &[(&str, &str)] = &[
    ("美联储释放降息信号，金价升至两周高点", "2024-01-15"),
    ("央行连续第十四个月增持黄金储备", "2024-01-15"),
    ("避险需求升温，现货黄金突破2050美元", "2024-01-14"),
    ("美元指数走强，黄金多头获利了结", "2024-01-14"),
    ("非农数据超预期，金价短线承压下挫", "2024-01-13"),
    ("地缘局势紧张，资金涌入黄金ETF", "2024-01-13"),
    ("黄金期货成交量创三个月新高", "2024-01-12"),
    ("美债收益率回升，金价窄幅震荡", "2024-01-12"),
    ("分析师：黄金中长期上行逻辑未变", "2024-01-11"),
    ("通胀数据温和，市场等待美联储决议", "2024-01-11"),
    ("实物金需求旺盛，金饰消费回暖", "2024-01-10"),
    ("黄金技术面转弱，关注2000美元支撑", "2024-01-10"),
];

/// Mock news source over a fixed headline list
#[derive(Clone, Debug)]
pub struct MockNewsSource {
    items: Vec<NewsItem>,
    page_size: usize,
}

impl Default for MockNewsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNewsSource {
    pub fn new() -> Self {
        let items = HEADLINES
            .iter()
            .enumerate()
            .map(|(i, (title, date))| {
                let url = format!(
                    "https://gold.fx678.com/content/{}/{:04}.shtml",
                    date.replace('-', ""),
                    i + 1
                );
                NewsItem::new(*title, url, *date)
            })
            .collect();

        Self::with_items(items)
    }

    /// Serve the given items instead of the built-in headlines
    pub fn with_items(items: Vec<NewsItem>) -> Self {
        Self {
            items,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl NewsSource for MockNewsSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<NewsItem>> {
        if page == 0 {
            return Ok(Vec::new());
        }
        let start = (page as usize - 1) * self.page_size;
        Ok(self
            .items
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    async fn fetch_detail(&self, url: &str) -> Result<NewsDetail> {
        let item = self
            .items
            .iter()
            .find(|item| item.url == url)
            .ok_or_else(|| AdvisorError::NewsSource(format!("no such article: {url}")))?;

        Ok(NewsDetail {
            url: item.url.clone(),
            title: item.title.clone(),
            content: format!("{}。市场人士表示，后续走势仍需关注美联储政策与美元动向。", item.title),
            publish_time: format!("{} 09:00:00", item.time),
            author: "汇通财经".into(),
            tags: vec!["黄金".into()],
        })
    }

    fn name(&self) -> &str {
        "MockNews"
    }
}
