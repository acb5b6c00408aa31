//! Price panel statistics

use serde::{Deserialize, Serialize};

use super::GoldPrice;
use crate::analysis::{mean, sample_std};

/// Half-over-half move needed to call a direction
const TREND_BAND: f64 = 0.02;

/// Direction of the later half of a series against the earlier half
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Rising,
    Falling,
    Sideways,
    /// Fewer than two quotes
    #[default]
    Undetermined,
}

impl PriceTrend {
    pub fn from_prices(prices: &[f64]) -> Self {
        if prices.len() < 2 {
            return Self::Undetermined;
        }
        let (first, second) = prices.split_at(prices.len() / 2);
        let (first, second) = (mean(first), mean(second));

        if second > first * (1.0 + TREND_BAND) {
            Self::Rising
        } else if second < first * (1.0 - TREND_BAND) {
            Self::Falling
        } else {
            Self::Sideways
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rising => "上升趋势",
            Self::Falling => "下降趋势",
            Self::Sideways => "横盘整理",
            Self::Undetermined => "无趋势",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    /// Last quote of the series
    pub current_price: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
    pub average_price: f64,
    pub price_range: f64,
    /// Sample standard deviation of the USD price
    pub volatility: f64,
    pub trend: PriceTrend,
}

/// Statistics of a USD price series, `None` when it is empty
pub fn price_statistics(history: &[GoldPrice]) -> Option<PriceStatistics> {
    let prices: Vec<f64> = history.iter().map(|p| p.price_usd).collect();
    let current_price = *prices.last()?;
    let highest_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest_price = prices.iter().copied().fold(f64::INFINITY, f64::min);

    Some(PriceStatistics {
        current_price,
        highest_price,
        lowest_price,
        average_price: mean(&prices),
        price_range: highest_price - lowest_price,
        volatility: sample_std(&prices),
        trend: PriceTrend::from_prices(&prices),
    })
}
