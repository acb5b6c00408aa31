//! Sentiment Series Analysis
//!
//! Pure transforms from a batch of `SentimentRecord`s to risk metrics, trend
//! statistics and classifier labels.

mod classify;
mod risk;
mod stats;
pub mod timeparse;
mod trend;

pub use classify::{average_score, classify_market, classify_risk, market_sentiment, risk_level};
pub use risk::{risk_metrics, risk_score, volume_risk, MAX_HEALTHY_VOLUME, MIN_HEALTHY_VOLUME};
pub use stats::{mean, population_std, round_to, sample_std};
pub use trend::{analyze_trend, direction_for_slope, sort_by_time};
