//! Gold Price Data
//!
//! Spot and daily gold quotes for the dashboard price panel. Sources are
//! tried in order by `PriceFeed`, which also keeps the last good answers
//! in a file cache.

mod feed;
mod metals;
mod mock;
mod stats;

pub use feed::{PriceFeed, CURRENT_TTL, HISTORY_TTL};
pub use metals::{MetalsLiveConfig, MetalsLiveSource, MetalsQuote};
pub use mock::MockPriceSource;
pub use stats::{price_statistics, PriceStatistics, PriceTrend};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fixed conversion used for the CNY quote
pub const CNY_PER_USD: f64 = 7.2;

/// One quote, per troy ounce
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoldPrice {
    /// Local time of the quote
    pub timestamp: NaiveDateTime,
    pub price_usd: f64,
    pub price_cny: f64,
    /// Absolute 24h change in USD
    pub change_24h: f64,
    pub change_percent_24h: f64,
    pub source: String,
}

impl GoldPrice {
    /// Quote with the CNY price derived from `price_usd`
    pub fn new(timestamp: NaiveDateTime, price_usd: f64, change_24h: f64, source: impl Into<String>) -> Self {
        let change_percent_24h = if price_usd > 0.0 { change_24h / price_usd * 100.0 } else { 0.0 };
        Self {
            timestamp,
            price_usd,
            price_cny: price_usd * CNY_PER_USD,
            change_24h,
            change_percent_24h,
            source: source.into(),
        }
    }
}

/// Price source trait (Strategy pattern)
///
/// Implement this for each quote provider.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest spot quote
    async fn current_price(&self) -> Result<GoldPrice>;

    /// One quote per day, oldest first, ending today
    async fn historical_prices(&self, days: usize) -> Result<Vec<GoldPrice>>;

    /// Source name
    fn name(&self) -> &str;
}
