//! Advice Synthesizer
//!
//! Composes classifier and trend outputs into a full `InvestmentAdvice`.
//!
//! ```text
//! records ──► risk_metrics ──► risk_level ─────┐
//!    │                                         ├──► rule tables ──► InvestmentAdvice
//!    ├──────► market_sentiment ────────────────┤
//!    └──────► analyze_trend ───────────────────┘
//! ```

mod rules;
mod summary;

pub use rules::{PositionSize, Stance, TimeHorizon, TrendSignal};
pub use summary::market_summary;

use crate::analysis::{analyze_trend, market_sentiment, risk_level, risk_metrics, round_to};
use crate::config::AdvisorConfig;
use crate::model::{
    InvestmentAdvice, MarketSentiment, RiskLevel, RiskMetrics, SentimentRecord, TrendAnalysis,
    TrendDirection,
};

pub const INSUFFICIENT_DATA_RECOMMENDATION: &str = "数据不足，建议观望";

/// Stateless advisor over an immutable configuration
#[derive(Clone, Debug, Default)]
pub struct InvestmentAdvisor {
    config: AdvisorConfig,
}

impl InvestmentAdvisor {
    pub const fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Build advice for a batch. Empty batches get `default_advice()`.
    pub fn advise(&self, records: &[SentimentRecord]) -> InvestmentAdvice {
        if records.is_empty() {
            return default_advice();
        }

        let market = market_sentiment(records, &self.config);
        let metrics = risk_metrics(records);
        let risk = risk_level(&metrics, &self.config);
        let trend = analyze_trend(records, &self.config.trend);
        let confidence_score = self.confidence_score(&metrics, &trend);

        tracing::debug!(
            "Advice: {:?}/{:?}, trend {:?} (strength {:.2}), confidence {:.3}",
            market,
            risk,
            trend.direction,
            trend.strength,
            confidence_score
        );

        InvestmentAdvice {
            market_sentiment: market,
            risk_level: risk,
            confidence_score,
            recommendation: rules::recommendation(market, risk, &trend).to_string(),
            reasoning: format!(
                "{} {}",
                base_reasoning(market, risk, &metrics),
                trend_reasoning(&trend)
            ),
            action_suggestions: action_suggestions(market, risk, &trend),
            risk_warnings: risk_warnings(risk, &metrics, &trend),
            time_horizon: TimeHorizon::base(market, risk).with_trend(&trend).label().to_string(),
            position_sizing: PositionSize::base(market, risk).with_trend(&trend).label().to_string(),
            trend_impact: trend_impact(&trend),
            trend_analysis: trend,
        }
    }

    /// Base blend of data quality factors plus the trend bonus, in [0, 1]
    fn confidence_score(&self, metrics: &RiskMetrics, trend: &TrendAnalysis) -> f64 {
        let c = &self.config.confidence;

        let analysis = if metrics.avg_confidence <= 0.0 {
            c.zero_confidence_fallback
        } else {
            metrics.avg_confidence
        };
        let volume = if c.volume_saturation == 0 {
            1.0
        } else {
            (metrics.news_count as f64 / c.volume_saturation as f64).min(1.0)
        };

        let blended = c.analysis_weight * analysis
            + c.volume_weight * volume
            + c.consistency_weight * (1.0 - metrics.consistency_risk)
            + c.stability_weight * (1.0 - metrics.sentiment_volatility);
        let base = round_to(blended.max(c.floor).clamp(0.0, 1.0), 3);

        let mut bonus = 0.1 * trend.strength + 0.1 * trend.consistency + 0.05 * (1.0 - trend.volatility);
        if (3..=30).contains(&trend.duration) {
            bonus += 0.05;
        }

        round_to((base + bonus).clamp(0.0, 1.0), 3)
    }
}

/// Advice for an empty batch
pub fn default_advice() -> InvestmentAdvice {
    InvestmentAdvice {
        market_sentiment: MarketSentiment::Neutral,
        risk_level: RiskLevel::High,
        confidence_score: 0.0,
        recommendation: INSUFFICIENT_DATA_RECOMMENDATION.into(),
        reasoning: "缺乏足够的市场数据进行分析".into(),
        action_suggestions: strings(&["等待更多市场数据", "关注市场动态", "保持谨慎态度"]),
        risk_warnings: strings(&["数据不足可能导致分析偏差", "建议等待更多信息后再做决策"]),
        time_horizon: "待定".into(),
        position_sizing: "暂不建议投资".into(),
        trend_analysis: TrendAnalysis::flat(),
        trend_impact: "数据不足，无法进行趋势分析".into(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn base_reasoning(market: MarketSentiment, risk: RiskLevel, metrics: &RiskMetrics) -> String {
    let mut parts = vec![
        format!("当前市场情绪为{}，风险等级为{}。", market.label(), risk.label()),
        format!("分析置信度为{:.1}%。", metrics.avg_confidence * 100.0),
        format!("基于{}条新闻数据的分析。", metrics.news_count),
    ];
    if let Some((sentiment, count)) = metrics.sentiment_distribution.dominant() {
        parts.push(format!("主要情感倾向为{}（{}条）。", sentiment.label(), count));
    }
    parts.join(" ")
}

fn trend_reasoning(trend: &TrendAnalysis) -> String {
    let direction = match trend.direction {
        TrendDirection::StrongUp => "强烈上升",
        TrendDirection::Up => "上升",
        TrendDirection::Sideways => "横盘整理",
        TrendDirection::Down => "下降",
        TrendDirection::StrongDown => "强烈下降",
    };

    let mut parts = vec![format!("趋势分析显示市场情感呈现{direction}态势")];

    let strength = trend.strength;
    parts.push(if strength > 0.7 {
        format!("趋势强度较高({strength:.2})")
    } else if strength > 0.4 {
        format!("趋势强度中等({strength:.2})")
    } else {
        format!("趋势强度较低({strength:.2})")
    });

    let volatility = trend.volatility;
    if volatility > 0.6 {
        parts.push(format!("市场波动率较高({volatility:.2})"));
    } else if volatility < 0.3 {
        parts.push(format!("市场相对稳定({volatility:.2})"));
    }

    parts.join("，") + "。"
}

fn action_suggestions(market: MarketSentiment, risk: RiskLevel, trend: &TrendAnalysis) -> Vec<String> {
    let mut out = if market.is_bullish() {
        strings(&["关注黄金ETF或实物黄金投资机会", "考虑分批建仓以降低时机风险", "关注美联储政策和通胀数据"])
    } else if market.is_bearish() {
        strings(&["考虑减少黄金配置或获利了结", "关注美元走势和实际利率变化", "可考虑黄金相关的看跌期权"])
    } else {
        strings(&["保持现有配置，等待明确信号", "密切关注市场动态和经济数据", "准备根据情况调整投资策略"])
    };

    if risk.is_elevated() {
        out.extend(strings(&["设置严格的止损点", "控制仓位规模，避免过度集中", "考虑分散投资降低风险"]));
    }

    if trend.direction.is_upward() {
        if trend.strength > 0.6 {
            out.push("趋势向上且强度较高，可考虑逐步建仓".into());
        }
        if trend.momentum > 0.2 {
            out.push("上升动量强劲，可适当关注买入机会".into());
        }
    } else if trend.direction.is_downward() {
        if trend.strength > 0.6 {
            out.push("下降趋势明确，建议谨慎或减仓".into());
        }
        if trend.momentum < -0.2 {
            out.push("下跌动量加速，需要控制风险".into());
        }
    }

    if trend.volatility > 0.7 {
        out.push("市场波动较大，建议分批操作".into());
    }

    if trend.duration > 14 && trend.consistency > 0.6 {
        out.push("趋势持续时间较长且一致性好，可考虑趋势跟随".into());
    } else if trend.duration < 3 {
        out.push("趋势刚刚形成，建议等待确认".into());
    }

    out
}

fn risk_warnings(risk: RiskLevel, metrics: &RiskMetrics, trend: &TrendAnalysis) -> Vec<String> {
    let mut out = vec!["黄金价格受多种因素影响，投资需谨慎".to_string()];

    match risk {
        RiskLevel::VeryHigh => out.extend(strings(&["当前市场风险极高，建议避免大额投资", "市场波动性较大，可能出现急剧变化"])),
        RiskLevel::High => out.extend(strings(&["当前市场风险较高，建议控制仓位", "注意市场情绪变化，及时调整策略"])),
        RiskLevel::Low | RiskLevel::Medium => {}
    }

    if metrics.confidence_risk > 0.5 {
        out.push("分析置信度较低，建议谨慎参考".into());
    }
    if metrics.consistency_risk > 0.6 {
        out.push("市场情绪分歧较大，存在不确定性".into());
    }
    if metrics.news_count < crate::analysis::MIN_HEALTHY_VOLUME {
        out.push("数据样本较少，分析结果可能不够全面".into());
    }

    if trend.volatility > 0.8 {
        out.push("市场情感波动极大，存在急剧变化风险".into());
    }
    if trend.consistency < 0.3 {
        out.push("趋势一致性较低，方向可能发生反转".into());
    }
    if trend.momentum.abs() > 0.5 {
        out.push("市场动量过强，可能存在过度反应风险".into());
    }
    if trend.duration > 30 {
        out.push("趋势持续时间较长，需警惕反转风险".into());
    }
    if trend.strength < 0.2 && trend.volatility > 0.6 {
        out.push("趋势不明确且波动较大，投资风险较高".into());
    }

    out
}

fn trend_impact(trend: &TrendAnalysis) -> String {
    let mut parts = vec![match trend.direction {
        TrendDirection::StrongUp => "强烈上升趋势支持积极投资策略",
        TrendDirection::Up => "上升趋势有利于投资机会",
        TrendDirection::StrongDown => "强烈下降趋势建议谨慎或避险",
        TrendDirection::Down => "下降趋势增加投资风险",
        TrendDirection::Sideways => "横盘趋势适合观望或区间操作",
    }
    .to_string()];

    if trend.strength > 0.7 {
        parts.push("高趋势强度增加决策信心".into());
    } else if trend.strength < 0.3 {
        parts.push("低趋势强度降低决策确定性".into());
    }

    if trend.volatility > 0.6 {
        parts.push("高波动率要求更严格的风险管理".into());
    }

    if trend.momentum.abs() > 0.3 {
        let hint = if trend.momentum > 0.0 { "支持趋势延续" } else { "暗示可能反转" };
        parts.push(format!("当前动量{hint}"));
    }

    parts.join("；") + "。"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sentiment;

    fn sample_batch() -> Vec<SentimentRecord> {
        vec![
            SentimentRecord::new("2024-01-01", Sentiment::Positive, 0.7, 0.8),
            SentimentRecord::new("2024-01-02", Sentiment::Positive, 0.5, 0.7),
            SentimentRecord::new("2024-01-03", Sentiment::Neutral, 0.1, 0.6),
        ]
    }

    #[test]
    fn test_empty_batch_gets_default() {
        let advice = InvestmentAdvisor::default().advise(&[]);
        assert_eq!(advice, default_advice());
        assert_eq!(advice.market_sentiment, MarketSentiment::Neutral);
        assert_eq!(advice.risk_level, RiskLevel::High);
        assert!(advice.confidence_score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_batch() {
        let advice = InvestmentAdvisor::default().advise(&sample_batch());

        assert_eq!(advice.market_sentiment, MarketSentiment::Bullish);
        assert_eq!(advice.trend_analysis.direction, TrendDirection::StrongDown);
        assert!(advice.reasoning.starts_with("当前市场情绪为温和看涨"));
        assert!(advice.reasoning.contains("基于3条新闻数据的分析。"));
        assert!(advice.reasoning.contains("主要情感倾向为正面（2条）。"));
        assert!(advice.risk_warnings.contains(&"数据样本较少，分析结果可能不够全面".to_string()));
        assert!(advice.trend_impact.starts_with("强烈下降趋势建议谨慎或避险"));
        assert!(advice.trend_impact.ends_with('。'));
    }

    #[test]
    fn test_confidence_blend() {
        // avg confidence 0.7, volume 0.3, two-class entropy, std*2 of [0.7,0.5,0.1]
        let advisor = InvestmentAdvisor::default();
        let records = sample_batch();
        let metrics = risk_metrics(&records);
        let trend = analyze_trend(&records, &advisor.config.trend);

        let base = 0.5 * 0.7
            + 0.2 * 0.3
            + 0.15 * (1.0 - metrics.consistency_risk)
            + 0.15 * (1.0 - metrics.sentiment_volatility);
        let expected = round_to(
            round_to(base, 3)
                + 0.1 * trend.strength
                + 0.1 * trend.consistency
                + 0.05 * (1.0 - trend.volatility)
                + 0.05,
            3,
        );
        assert!((advisor.confidence_score(&metrics, &trend) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_confidence_uses_fallback() {
        let records = vec![SentimentRecord::new("2024-01-01", Sentiment::Neutral, 0.0, 0.0); 5];
        let advice = InvestmentAdvisor::default().advise(&records);
        // 0.5*0.3 + 0.2*0.5 + 0.15 + 0.15 = 0.55; trend bonus 0.05 + duration 1 day
        assert!((advice.confidence_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_advice_is_deterministic() {
        let advisor = InvestmentAdvisor::default();
        let first = serde_json::to_string(&advisor.advise(&sample_batch())).unwrap();
        let second = serde_json::to_string(&advisor.advise(&sample_batch())).unwrap();
        assert_eq!(first, second);
    }
}
