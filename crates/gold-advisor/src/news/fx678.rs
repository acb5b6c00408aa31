//! fx678 Gold Channel Source
//!
//! Scrapes the paged gold-news list and article pages of gold.fx678.com.
//! Markup is extracted with a handful of regular expressions; the pages are
//! simple enough that a DOM is not needed.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use gold_core::RetryPolicy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use super::NewsSource;
use crate::error::{AdvisorError, Result};
use crate::model::{NewsDetail, NewsItem};

const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Paragraphs at or below this many characters are navigation noise
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Source configuration
#[derive(Clone, Debug)]
pub struct Fx678Config {
    pub base_url: String,
    pub list_path: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for Fx678Config {
    fn default() -> Self {
        Self {
            base_url: "https://gold.fx678.com".into(),
            list_path: "/goldNews/hj".into(),
            timeout: Duration::from_secs(10),
            // waits 2s then 4s between the three attempts
            retry: RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(8)),
        }
    }
}

impl Fx678Config {
    pub fn list_url(&self, page: u32) -> String {
        format!("{}{}?p={}", self.base_url.trim_end_matches('/'), self.list_path, page)
    }
}

/// Compiled extraction patterns
pub struct Fx678Parser {
    anchor: Regex,
    tag: Regex,
    whitespace: Regex,
    url_date: Regex,
    heading: Regex,
    paragraph: Regex,
    boilerplate: Regex,
    publish_time: Regex,
    site_suffix: Regex,
    channel_suffix: Regex,
    author: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AdvisorError::Parse(format!("bad pattern {pattern}: {e}")))
}

impl Fx678Parser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor: compile(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)?,
            tag: compile(r"(?s)<[^>]*>")?,
            whitespace: compile(r"\s+")?,
            url_date: compile(r"(\d{4})(\d{2})(\d{2})")?,
            heading: compile(r"(?is)<h1[^>]*>(.*?)</h1>")?,
            paragraph: compile(r"(?is)<p[^>]*>(.*?)</p>")?,
            boilerplate: compile(r"版权|转载|来源|责任编辑|免责声明")?,
            publish_time: compile(r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}")?,
            site_suffix: compile(r"-[^-]*汇通网.*$")?,
            channel_suffix: compile(r"-[^-]*黄金.*$")?,
            author: compile(r"(?:作者|编辑)[:：]\s*([^\s<]{1,20})")?,
        })
    }

    /// Visible text of an HTML fragment
    fn text(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, " ");
        let decoded = decode_entities(&stripped);
        self.whitespace.replace_all(&decoded, " ").trim().to_string()
    }

    /// Absolute URL for an href on `base_url`
    fn absolute(base_url: &str, href: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if let Some(rest) = href.strip_prefix("//") {
            format!("https://{rest}")
        } else if href.starts_with('/') {
            format!("{base}{href}")
        } else {
            format!("{base}/{href}")
        }
    }

    /// `YYYY-MM-DD` from the first 8-digit run in a URL, else empty
    fn date_from_url(&self, url: &str) -> String {
        self.url_date
            .captures(url)
            .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]))
            .unwrap_or_default()
    }

    /// Article links on a list page, deduplicated by URL
    pub fn parse_list(&self, html: &str, base_url: &str, crawl_time: &str) -> Vec<NewsItem> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for caps in self.anchor.captures_iter(html) {
            let href = caps[1].trim();
            if !href.contains("/content/") {
                continue;
            }

            let title = self.text(&caps[2]);
            if title.is_empty() {
                continue;
            }

            let url = Self::absolute(base_url, href);
            if !seen.insert(url.clone()) {
                continue;
            }

            items.push(NewsItem {
                title,
                time: self.date_from_url(&url),
                crawl_time: crawl_time.to_string(),
                url,
                ..Default::default()
            });
        }

        items
    }

    /// Title, body, publish time and author of an article page
    pub fn parse_detail(&self, html: &str, url: &str) -> NewsDetail {
        let title = self
            .heading
            .captures(html)
            .map(|c| self.text(&c[1]))
            .map(|t| {
                let t = self.site_suffix.replace(&t, "");
                self.channel_suffix.replace(&t, "").trim().to_string()
            })
            .unwrap_or_default();

        let content = self
            .paragraph
            .captures_iter(html)
            .map(|c| self.text(&c[1]))
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS && !self.boilerplate.is_match(p))
            .collect::<Vec<_>>()
            .join("\n\n");

        let page_text = self.text(html);
        let publish_time = self
            .publish_time
            .find(&page_text)
            .map(|m| self.whitespace.replace_all(m.as_str(), " ").to_string())
            .unwrap_or_default();
        let author = self
            .author
            .captures(&page_text)
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        NewsDetail {
            url: url.to_string(),
            title,
            content,
            publish_time,
            author,
            tags: Vec::new(),
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// HTTP source for gold.fx678.com
pub struct Fx678Source {
    client: reqwest::Client,
    config: Fx678Config,
    parser: Fx678Parser,
}

impl Fx678Source {
    pub fn new(config: Fx678Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            parser: Fx678Parser::new()?,
        })
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        self.config
            .retry
            .run(&format!("GET {url}"), || self.get_once(url))
            .await
    }
}

#[async_trait]
impl NewsSource for Fx678Source {
    async fn fetch_page(&self, page: u32) -> Result<Vec<NewsItem>> {
        let url = self.config.list_url(page);
        let html = self.get_html(&url).await?;
        let crawl_time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Ok(self.parser.parse_list(&html, &self.config.base_url, &crawl_time))
    }

    async fn fetch_detail(&self, url: &str) -> Result<NewsDetail> {
        let html = self.get_html(url).await?;
        Ok(self.parser.parse_detail(&html, url))
    }

    fn name(&self) -> &str {
        "fx678"
    }
}
