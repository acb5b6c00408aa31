//! Risk Metrics Calculator
//!
//! Reduces a batch to volatility, confidence, volume and consistency risk.

use super::stats::{entropy, mean, population_std};
use crate::config::RiskWeights;
use crate::model::{RiskMetrics, SentimentDistribution, SentimentRecord};

/// Batches smaller than this are "data insufficient"
pub const MIN_HEALTHY_VOLUME: usize = 5;
/// Batches larger than this are "information overload"
pub const MAX_HEALTHY_VOLUME: usize = 50;

const SPARSE_VOLUME_RISK: f64 = 0.8;
const OVERLOAD_VOLUME_RISK: f64 = 0.6;
const HEALTHY_VOLUME_RISK: f64 = 0.2;

/// Volume risk for a batch size
pub const fn volume_risk(news_count: usize) -> f64 {
    if news_count < MIN_HEALTHY_VOLUME {
        SPARSE_VOLUME_RISK
    } else if news_count > MAX_HEALTHY_VOLUME {
        OVERLOAD_VOLUME_RISK
    } else {
        HEALTHY_VOLUME_RISK
    }
}

/// Compute risk metrics. An empty batch gets zero volatility, zero average
/// confidence (so confidence risk 1) and zero consistency risk.
pub fn risk_metrics(records: &[SentimentRecord]) -> RiskMetrics {
    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
    let confidences: Vec<f64> = records.iter().map(|r| r.confidence).collect();
    let distribution = SentimentDistribution::from_records(records);

    let sentiment_volatility = (population_std(&scores) * 2.0).clamp(0.0, 1.0);
    let avg_confidence = mean(&confidences).clamp(0.0, 1.0);

    RiskMetrics {
        sentiment_volatility,
        confidence_risk: (1.0 - avg_confidence).clamp(0.0, 1.0),
        volume_risk: volume_risk(records.len()),
        consistency_risk: consistency_risk(&distribution),
        avg_confidence,
        news_count: records.len(),
        sentiment_distribution: distribution,
    }
}

/// Normalised entropy of the class distribution
fn consistency_risk(distribution: &SentimentDistribution) -> f64 {
    let distinct = distribution.distinct().min(3);
    if distinct < 2 {
        return 0.0;
    }
    let max_entropy = (distinct as f64).log2();
    (entropy(distribution.iter().map(|(_, n)| n)) / max_entropy).clamp(0.0, 1.0)
}

/// Weighted risk score in [0, 1]
pub fn risk_score(metrics: &RiskMetrics, weights: &RiskWeights) -> f64 {
    let score = metrics.sentiment_volatility * weights.volatility
        + metrics.confidence_risk * weights.confidence
        + metrics.volume_risk * weights.volume
        + metrics.consistency_risk * weights.consistency;
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sentiment;

    fn record(sentiment: Sentiment, score: f64, confidence: f64) -> SentimentRecord {
        SentimentRecord::new("2024-01-01", sentiment, score, confidence)
    }

    #[test]
    fn test_volume_boundaries() {
        assert!((volume_risk(1) - 0.8).abs() < f64::EPSILON);
        assert!((volume_risk(4) - 0.8).abs() < f64::EPSILON);
        assert!((volume_risk(5) - 0.2).abs() < f64::EPSILON);
        assert!((volume_risk(50) - 0.2).abs() < f64::EPSILON);
        assert!((volume_risk(51) - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_batch() {
        let metrics = risk_metrics(&[]);
        assert!(metrics.sentiment_volatility.abs() < f64::EPSILON);
        assert!((metrics.confidence_risk - 1.0).abs() < f64::EPSILON);
        assert!(metrics.consistency_risk.abs() < f64::EPSILON);
        assert_eq!(metrics.news_count, 0);
    }

    #[test]
    fn test_single_record_has_no_volatility() {
        let metrics = risk_metrics(&[record(Sentiment::Positive, 0.9, 0.8)]);
        assert!(metrics.sentiment_volatility.abs() < f64::EPSILON);
        assert!((metrics.confidence_risk - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_two_way_split_is_fully_inconsistent() {
        let records = [
            record(Sentiment::Positive, 0.5, 0.5),
            record(Sentiment::Negative, -0.5, 0.5),
        ];
        let metrics = risk_metrics(&records);
        assert!((metrics.consistency_risk - 1.0).abs() < 1e-12);
        // std 0.5, doubled
        assert!((metrics.sentiment_volatility - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_class_has_no_consistency_risk() {
        let records = vec![record(Sentiment::Neutral, 0.0, 0.5); 6];
        assert!(risk_metrics(&records).consistency_risk.abs() < f64::EPSILON);
    }

    #[test]
    fn test_risk_score_weights() {
        let metrics = RiskMetrics {
            sentiment_volatility: 1.0,
            confidence_risk: 0.0,
            volume_risk: 0.2,
            consistency_risk: 0.0,
            ..Default::default()
        };
        let score = risk_score(&metrics, &RiskWeights::default());
        assert!((score - 0.34).abs() < 1e-12);
    }
}
