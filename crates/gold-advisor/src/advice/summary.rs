//! Market summary projection for the dashboard header

use chrono::NaiveDateTime;

use super::{InvestmentAdvisor, INSUFFICIENT_DATA_RECOMMENDATION};
use crate::analysis::{average_score, round_to};
use crate::config::AdvisorConfig;
use crate::model::{MarketSentiment, MarketSummary, RiskLevel, SentimentRecord};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Headline figures for a batch, stamped with `now`
pub fn market_summary(records: &[SentimentRecord], config: &AdvisorConfig, now: NaiveDateTime) -> MarketSummary {
    let last_update = now.format(TIMESTAMP_FORMAT).to_string();

    if records.is_empty() {
        return MarketSummary {
            total_news: 0,
            market_sentiment: MarketSentiment::Neutral,
            risk_level: RiskLevel::High,
            confidence: 0.0,
            average_sentiment_score: 0.0,
            recommendation: INSUFFICIENT_DATA_RECOMMENDATION.into(),
            last_update,
        };
    }

    let advice = InvestmentAdvisor::new(config.clone()).advise(records);

    MarketSummary {
        total_news: records.len(),
        market_sentiment: advice.market_sentiment,
        risk_level: advice.risk_level,
        confidence: advice.confidence_score,
        average_sentiment_score: round_to(average_score(records), 3),
        recommendation: advice.recommendation,
        last_update,
    }
}
