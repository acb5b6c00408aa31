//! Market & Risk Classifiers
//!
//! Both are first-match scans over sorted cut lists from `AdvisorConfig`.

use super::risk::risk_score;
use super::stats::mean;
use crate::config::AdvisorConfig;
use crate::model::{MarketSentiment, RiskLevel, RiskMetrics, SentimentRecord};

/// Label for an average score
pub fn classify_market(average_score: f64, config: &AdvisorConfig) -> MarketSentiment {
    config
        .sentiment_cuts
        .iter()
        .find(|cut| cut.bound.admits(average_score, cut.threshold))
        .map_or(config.sentiment_floor, |cut| cut.label)
}

/// Average score of a batch; 0 when empty
pub fn average_score(records: &[SentimentRecord]) -> f64 {
    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
    mean(&scores)
}

/// Market sentiment of a batch; neutral when empty
pub fn market_sentiment(records: &[SentimentRecord], config: &AdvisorConfig) -> MarketSentiment {
    if records.is_empty() {
        return MarketSentiment::Neutral;
    }
    classify_market(average_score(records), config)
}

/// Tier for a weighted risk score
pub fn classify_risk(score: f64, config: &AdvisorConfig) -> RiskLevel {
    config
        .risk_cuts
        .iter()
        .find(|cut| score < cut.below)
        .map_or(config.risk_ceiling, |cut| cut.level)
}

/// Tier for a set of risk metrics
pub fn risk_level(metrics: &RiskMetrics, config: &AdvisorConfig) -> RiskLevel {
    classify_risk(risk_score(metrics, &config.risk_weights), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bound, SentimentCut};

    #[test]
    fn test_market_cut_points() {
        let config = AdvisorConfig::default();
        assert_eq!(classify_market(0.61, &config), MarketSentiment::VeryBullish);
        assert_eq!(classify_market(0.6, &config), MarketSentiment::Bullish);
        assert_eq!(classify_market(0.2, &config), MarketSentiment::Neutral);
        assert_eq!(classify_market(-0.2, &config), MarketSentiment::Neutral);
        assert_eq!(classify_market(-0.21, &config), MarketSentiment::Bearish);
        assert_eq!(classify_market(-0.6, &config), MarketSentiment::Bearish);
        assert_eq!(classify_market(-0.61, &config), MarketSentiment::VeryBearish);
    }

    #[test]
    fn test_risk_cut_points() {
        let config = AdvisorConfig::default();
        assert_eq!(classify_risk(0.29, &config), RiskLevel::Low);
        assert_eq!(classify_risk(0.3, &config), RiskLevel::Medium);
        assert_eq!(classify_risk(0.5, &config), RiskLevel::High);
        assert_eq!(classify_risk(0.7, &config), RiskLevel::VeryHigh);
    }

    #[test]
    fn test_empty_batch_is_neutral() {
        assert_eq!(market_sentiment(&[], &AdvisorConfig::default()), MarketSentiment::Neutral);
    }

    #[test]
    fn test_alternate_thresholds() {
        let config = AdvisorConfig {
            sentiment_cuts: vec![SentimentCut {
                threshold: 0.0,
                bound: Bound::Above,
                label: MarketSentiment::Bullish,
            }],
            sentiment_floor: MarketSentiment::Bearish,
            ..Default::default()
        };
        assert_eq!(classify_market(0.01, &config), MarketSentiment::Bullish);
        assert_eq!(classify_market(0.0, &config), MarketSentiment::Bearish);
    }
}
