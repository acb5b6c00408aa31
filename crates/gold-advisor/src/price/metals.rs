//! metals.live Spot Source
//!
//! Live spot quote from the public metals.live endpoint. The endpoint has
//! no history, so `historical_prices` always fails and `PriceFeed` moves
//! on to the next source.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use gold_core::RetryPolicy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use serde::Deserialize;

use super::{GoldPrice, PriceSource, CNY_PER_USD};
use crate::error::{AdvisorError, Result};

#[derive(Clone, Debug)]
pub struct MetalsLiveConfig {
    pub url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for MetalsLiveConfig {
    fn default() -> Self {
        Self {
            url: "https://api.metals.live/v1/spot/gold".into(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::new(2, Duration::from_secs(1), Duration::from_secs(2)),
        }
    }
}

/// Reply body of the spot endpoint
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetalsQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl MetalsQuote {
    pub fn into_price(self, at: NaiveDateTime) -> Result<GoldPrice> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(AdvisorError::PriceSource(format!("metals.live quoted {}", self.price)));
        }
        Ok(GoldPrice {
            timestamp: at,
            price_usd: self.price,
            price_cny: self.price * CNY_PER_USD,
            change_24h: self.change,
            change_percent_24h: self.change_percent,
            source: "metals.live".into(),
        })
    }
}

pub struct MetalsLiveSource {
    client: reqwest::Client,
    config: MetalsLiveConfig,
}

impl MetalsLiveSource {
    pub fn new(config: MetalsLiveConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_once(&self) -> Result<MetalsQuote> {
        let response = self.client.get(&self.config.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::HttpStatus {
                status: status.as_u16(),
                url: self.config.url.clone(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PriceSource for MetalsLiveSource {
    async fn current_price(&self) -> Result<GoldPrice> {
        let quote = self
            .config
            .retry
            .run("metals.live spot", || self.fetch_once())
            .await?;
        quote.into_price(Local::now().naive_local())
    }

    async fn historical_prices(&self, _days: usize) -> Result<Vec<GoldPrice>> {
        Err(AdvisorError::PriceSource("metals.live has no daily history".into()))
    }

    fn name(&self) -> &str {
        "metals.live"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15).and_then(|d| d.and_hms_opt(9, 30, 0)).unwrap()
    }

    #[test]
    fn test_quote_reply() {
        let quote: MetalsQuote =
            serde_json::from_str(r#"{"price": 2041.5, "change": -8.2, "change_percent": -0.4}"#).unwrap();
        let price = quote.into_price(at()).unwrap();

        assert_eq!(price.price_usd, 2041.5);
        assert!((price.price_cny - 2041.5 * 7.2).abs() < 1e-9);
        assert_eq!(price.change_percent_24h, -0.4);
        assert_eq!(price.source, "metals.live");
    }

    #[test]
    fn test_reply_without_price_rejected() {
        let quote: MetalsQuote = serde_json::from_str(r#"{"change": 1.0}"#).unwrap();
        assert!(matches!(quote.into_price(at()), Err(AdvisorError::PriceSource(_))));
    }

    #[tokio::test]
    async fn test_no_history() {
        let source = MetalsLiveSource::new(MetalsLiveConfig::default()).unwrap();
        assert!(source.historical_prices(7).await.is_err());
    }
}
