//! Advisory Configuration
//!
//! Thresholds and weights for the classifiers, trend analyzer and
//! confidence blend. `AdvisorConfig::default()` carries the production
//! values; tests may pass alternates.

use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::model::{MarketSentiment, RiskLevel};

/// How a cut point compares against a value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// value > threshold
    Above,
    /// value >= threshold
    AtLeast,
}

impl Bound {
    pub fn admits(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value > threshold,
            Self::AtLeast => value >= threshold,
        }
    }
}

/// Market cut point, scanned from the highest threshold down
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentCut {
    pub threshold: f64,
    pub bound: Bound,
    pub label: MarketSentiment,
}

/// Risk cut point: scores strictly below `below` get `level`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskCut {
    pub below: f64,
    pub level: RiskLevel,
}

/// Weights of the four risk components
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub volatility: f64,
    pub confidence: f64,
    pub volume: f64,
    pub consistency: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            volatility: 0.30,
            confidence: 0.25,
            volume: 0.20,
            consistency: 0.25,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.volatility + self.confidence + self.volume + self.consistency
    }
}

/// Trend analyzer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Smaller batches yield the flat trend
    pub min_data_points: usize,
    /// Recent window for momentum and recent change
    pub short_window: usize,
    /// Slope magnitude for a mild trend; twice this is a strong trend
    pub slope_threshold: f64,
    /// Adjacent moves at or below this magnitude cast no vote
    pub flat_epsilon: f64,
    /// Momentum normalisation (max plausible score spread)
    pub momentum_divisor: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_data_points: 3,
            short_window: 3,
            slope_threshold: 0.1,
            flat_epsilon: 0.01,
            momentum_divisor: 2.0,
        }
    }
}

/// Base confidence blend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    pub analysis_weight: f64,
    pub volume_weight: f64,
    pub consistency_weight: f64,
    pub stability_weight: f64,
    /// Record count at which the data-volume factor saturates
    pub volume_saturation: usize,
    /// Substituted when the mean analysis confidence is exactly zero
    pub zero_confidence_fallback: f64,
    pub floor: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            analysis_weight: 0.5,
            volume_weight: 0.2,
            consistency_weight: 0.15,
            stability_weight: 0.15,
            volume_saturation: 10,
            zero_confidence_fallback: 0.3,
            floor: 0.1,
        }
    }
}

/// Immutable advisory configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub sentiment_cuts: Vec<SentimentCut>,
    /// Label when no cut matches
    pub sentiment_floor: MarketSentiment,
    pub risk_cuts: Vec<RiskCut>,
    /// Level when no cut matches
    pub risk_ceiling: RiskLevel,
    pub risk_weights: RiskWeights,
    pub trend: TrendConfig,
    pub confidence: ConfidenceConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            sentiment_cuts: vec![
                SentimentCut { threshold: 0.6, bound: Bound::Above, label: MarketSentiment::VeryBullish },
                SentimentCut { threshold: 0.2, bound: Bound::Above, label: MarketSentiment::Bullish },
                SentimentCut { threshold: -0.2, bound: Bound::AtLeast, label: MarketSentiment::Neutral },
                SentimentCut { threshold: -0.6, bound: Bound::AtLeast, label: MarketSentiment::Bearish },
            ],
            sentiment_floor: MarketSentiment::VeryBearish,
            risk_cuts: vec![
                RiskCut { below: 0.3, level: RiskLevel::Low },
                RiskCut { below: 0.5, level: RiskLevel::Medium },
                RiskCut { below: 0.7, level: RiskLevel::High },
            ],
            risk_ceiling: RiskLevel::VeryHigh,
            risk_weights: RiskWeights::default(),
            trend: TrendConfig::default(),
            confidence: ConfidenceConfig::default(),
        }
    }
}

impl AdvisorConfig {
    /// Check cut ordering and weight sanity, reporting every problem
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self
            .sentiment_cuts
            .windows(2)
            .any(|w| w[0].threshold < w[1].threshold)
        {
            problems.push("sentiment cuts must be sorted by descending threshold".to_string());
        }
        if self.risk_cuts.windows(2).any(|w| w[0].below > w[1].below) {
            problems.push("risk cuts must be sorted by ascending bound".to_string());
        }
        let weight_sum = self.risk_weights.sum();
        if (weight_sum - 1.0).abs() > 1e-9 {
            problems.push(format!("risk weights sum to {weight_sum}, expected 1"));
        }
        if self.trend.min_data_points < 2 {
            problems.push("trend needs at least 2 data points".to_string());
        }
        if self.trend.short_window == 0 {
            problems.push("short window must be positive".to_string());
        }
        if self.trend.momentum_divisor <= 0.0 {
            problems.push("momentum divisor must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::Config(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AdvisorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unsorted_cuts_rejected() {
        let mut config = AdvisorConfig::default();
        config.risk_cuts.reverse();
        config.risk_weights.volume = 0.5;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("risk cuts"));
        assert!(err.contains("risk weights"));
    }

    #[test]
    fn test_bound_semantics() {
        assert!(!Bound::Above.admits(0.2, 0.2));
        assert!(Bound::AtLeast.admits(-0.2, -0.2));
    }
}
