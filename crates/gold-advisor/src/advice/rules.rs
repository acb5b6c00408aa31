//! Advice Rule Tables
//!
//! The recommendation grid and the trend adjustments are enumerated rules
//! rather than string surgery, so every (cell, signal) pair has a defined
//! outcome.

use crate::model::{MarketSentiment, RiskLevel, TrendAnalysis};

/// Direction of a base recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stance {
    Increase,
    Hold,
    Decrease,
    Watch,
}

/// One cell of the sentiment × risk grid
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub stance: Stance,
    pub text: &'static str,
    /// Wording when a strong trend agrees with `stance`
    pub reinforced: &'static str,
}

const fn cell(stance: Stance, text: &'static str, reinforced: &'static str) -> Cell {
    Cell { stance, text, reinforced }
}

/// Base recommendation for a market mood and risk tier
pub const fn recommendation_cell(market: MarketSentiment, risk: RiskLevel) -> Cell {
    use MarketSentiment as M;
    use RiskLevel as R;
    use Stance::{Decrease, Hold, Increase, Watch};

    match (market, risk) {
        (M::VeryBullish, R::Low) => cell(
            Increase,
            "强烈建议增加黄金配置，市场情绪极度乐观且风险可控",
            "强烈建议增加黄金配置，市场情绪极度乐观且上升趋势明确",
        ),
        (M::VeryBullish, R::Medium) => cell(
            Increase,
            "建议适度增加黄金配置，但需注意风险管理",
            "强烈建议适度增加黄金配置，但需注意风险管理",
        ),
        (M::VeryBullish, R::High) => cell(
            Increase,
            "谨慎看涨，建议小幅增加配置并设置止损",
            "谨慎看涨，强烈建议小幅增加配置并设置止损",
        ),
        (M::VeryBullish, R::VeryHigh) => cell(
            Watch,
            "虽然情绪乐观，但风险极高，建议观望",
            "虽然情绪乐观，但风险极高，建议观望",
        ),
        (M::Bullish, R::Low) => cell(
            Increase,
            "建议增加黄金配置，市场情绪积极",
            "强烈建议增加黄金配置，市场情绪积极",
        ),
        (M::Bullish, R::Medium) => cell(
            Increase,
            "建议适度增加黄金配置",
            "强烈建议适度增加黄金配置",
        ),
        (M::Bullish, R::High) => cell(
            Increase,
            "谨慎乐观，可考虑小幅增加配置",
            "谨慎乐观，强烈建议小幅增加配置",
        ),
        (M::Bullish, R::VeryHigh) => cell(
            Watch,
            "情绪积极但风险过高，建议观望",
            "情绪积极但风险过高，建议观望",
        ),
        (M::Neutral, R::Low) => cell(
            Hold,
            "建议保持现有配置，市场情绪中性",
            "建议保持现有配置，市场情绪中性",
        ),
        (M::Neutral, R::Medium) => cell(
            Hold,
            "建议保持现有配置并观察市场变化",
            "建议保持现有配置并观察市场变化",
        ),
        (M::Neutral, R::High) => cell(
            Hold,
            "建议保持谨慎，避免大幅调整配置",
            "建议保持谨慎，避免大幅调整配置",
        ),
        (M::Neutral, R::VeryHigh) => cell(
            Watch,
            "市场不确定性高，建议观望",
            "市场不确定性高，建议观望",
        ),
        (M::Bearish, R::Low) => cell(
            Decrease,
            "建议减少黄金配置，市场情绪偏悲观",
            "强烈建议减少黄金配置，市场情绪偏悲观",
        ),
        (M::Bearish, R::Medium) => cell(
            Decrease,
            "建议适度减少黄金配置",
            "强烈建议适度减少黄金配置",
        ),
        (M::Bearish, R::High) => cell(
            Decrease,
            "建议减少配置并加强风险管理",
            "强烈建议减少配置并加强风险管理",
        ),
        (M::Bearish, R::VeryHigh) => cell(
            Decrease,
            "强烈建议减少配置，风险极高",
            "强烈建议尽快减少配置，风险极高",
        ),
        (M::VeryBearish, R::Low) => cell(
            Decrease,
            "强烈建议减少黄金配置，市场情绪极度悲观",
            "强烈建议减少黄金配置，市场情绪极度悲观且下降趋势明确",
        ),
        (M::VeryBearish, R::Medium) => cell(
            Decrease,
            "建议大幅减少黄金配置",
            "强烈建议大幅减少黄金配置",
        ),
        (M::VeryBearish, R::High) => cell(
            Decrease,
            "建议大幅减少配置并考虑对冲",
            "强烈建议大幅减少配置并考虑对冲",
        ),
        (M::VeryBearish, R::VeryHigh) => cell(
            Watch,
            "建议避免黄金投资，风险极高",
            "建议避免黄金投资，风险极高",
        ),
    }
}

/// Trend bucket relevant to the recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendSignal {
    StrongUp,
    StrongDown,
    Turbulent,
    Unremarkable,
}

/// Strength and consistency above which a trend counts as established
pub const STRONG_TREND_STRENGTH: f64 = 0.7;
pub const STRONG_TREND_CONSISTENCY: f64 = 0.6;
/// Volatility above which directional calls are withdrawn
pub const TURBULENT_VOLATILITY: f64 = 0.8;

const fn is_established(trend: &TrendAnalysis) -> bool {
    trend.strength > STRONG_TREND_STRENGTH && trend.consistency > STRONG_TREND_CONSISTENCY
}

impl TrendSignal {
    /// Turbulence wins over any direction
    pub const fn of(trend: &TrendAnalysis) -> Self {
        if trend.volatility > TURBULENT_VOLATILITY {
            Self::Turbulent
        } else if is_established(trend) && trend.direction.is_upward() {
            Self::StrongUp
        } else if is_established(trend) && trend.direction.is_downward() {
            Self::StrongDown
        } else {
            Self::Unremarkable
        }
    }
}

/// What a trend signal does to a base recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Keep,
    Emphasize,
    LeanUp,
    LeanDown,
    Caution,
}

pub const fn adjustment(stance: Stance, signal: TrendSignal) -> Adjustment {
    match (stance, signal) {
        (Stance::Increase, TrendSignal::StrongUp) | (Stance::Decrease, TrendSignal::StrongDown) => {
            Adjustment::Emphasize
        }
        (Stance::Hold, TrendSignal::StrongUp) => Adjustment::LeanUp,
        (Stance::Hold, TrendSignal::StrongDown) => Adjustment::LeanDown,
        (Stance::Increase | Stance::Decrease, TrendSignal::Turbulent) => Adjustment::Caution,
        _ => Adjustment::Keep,
    }
}

pub const LEAN_UP_TEXT: &str = "建议适度增加黄金配置，情绪趋势明确向上";
pub const LEAN_DOWN_TEXT: &str = "建议适度减少黄金配置，情绪趋势明确向下";
pub const CAUTION_TEXT: &str = "建议保持谨慎，密切观察市场变化";

/// Final recommendation text
pub const fn recommendation(market: MarketSentiment, risk: RiskLevel, trend: &TrendAnalysis) -> &'static str {
    let base = recommendation_cell(market, risk);
    match adjustment(base.stance, TrendSignal::of(trend)) {
        Adjustment::Keep => base.text,
        Adjustment::Emphasize => base.reinforced,
        Adjustment::LeanUp => LEAN_UP_TEXT,
        Adjustment::LeanDown => LEAN_DOWN_TEXT,
        Adjustment::Caution => CAUTION_TEXT,
    }
}

/// Suggested holding period
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeHorizon {
    Short,
    ShortMedium,
    Medium,
    MediumLong,
}

impl TimeHorizon {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Short => "短期（1-4周）",
            Self::ShortMedium => "中短期（1-3个月）",
            Self::Medium => "中期（3-6个月）",
            Self::MediumLong => "中长期（6-12个月）",
        }
    }

    pub const fn base(market: MarketSentiment, risk: RiskLevel) -> Self {
        if risk.is_elevated() {
            Self::Short
        } else if market.is_extreme() {
            Self::ShortMedium
        } else {
            Self::Medium
        }
    }

    const fn lengthened(self) -> Self {
        match self {
            Self::Short => Self::ShortMedium,
            Self::ShortMedium => Self::Medium,
            Self::Medium | Self::MediumLong => Self::MediumLong,
        }
    }

    const fn shortened(self) -> Self {
        match self {
            Self::Medium => Self::Short,
            Self::MediumLong => Self::Medium,
            other => other,
        }
    }

    /// Established trends lengthen the horizon; turbulence shortens it
    pub const fn with_trend(self, trend: &TrendAnalysis) -> Self {
        if is_established(trend) {
            self.lengthened()
        } else if trend.volatility > TURBULENT_VOLATILITY {
            self.shortened()
        } else {
            self
        }
    }
}

/// Suggested position size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionSize {
    Tiny,
    Small,
    Moderate,
    Balanced,
}

/// Volatility below which an established trend may size up
const CALM_VOLATILITY: f64 = 0.5;
/// Consistency below which positions are trimmed
const ERRATIC_CONSISTENCY: f64 = 0.3;

impl PositionSize {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tiny => "极小仓位（<5%）",
            Self::Small => "小仓位（5-10%）",
            Self::Moderate => "中等仓位（10-20%）",
            Self::Balanced => "适中仓位（15-25%）",
        }
    }

    pub const fn base(market: MarketSentiment, risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::VeryHigh => Self::Tiny,
            RiskLevel::High => Self::Small,
            _ if market.is_extreme() => Self::Moderate,
            _ => Self::Balanced,
        }
    }

    pub const fn with_trend(self, trend: &TrendAnalysis) -> Self {
        if is_established(trend) && trend.volatility < CALM_VOLATILITY {
            match self {
                Self::Tiny => Self::Small,
                Self::Small => Self::Moderate,
                other => other,
            }
        } else if trend.volatility > TURBULENT_VOLATILITY || trend.consistency < ERRATIC_CONSISTENCY {
            match self {
                Self::Moderate | Self::Balanced => Self::Small,
                other => other,
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrendDirection;

    fn trend(direction: TrendDirection, strength: f64, consistency: f64, volatility: f64) -> TrendAnalysis {
        TrendAnalysis {
            direction,
            strength,
            consistency,
            volatility,
            ..TrendAnalysis::flat()
        }
    }

    #[test]
    fn test_grid_is_total() {
        for market in MarketSentiment::ALL {
            for risk in RiskLevel::ALL {
                let cell = recommendation_cell(market, risk);
                assert!(!cell.text.is_empty());
                assert!(!cell.reinforced.is_empty());
            }
        }
    }

    #[test]
    fn test_strong_aligned_trend_emphasizes() {
        let up = trend(TrendDirection::StrongUp, 0.9, 0.8, 0.3);
        assert_eq!(
            recommendation(MarketSentiment::Bullish, RiskLevel::Low, &up),
            "强烈建议增加黄金配置，市场情绪积极"
        );
        assert_eq!(
            recommendation(MarketSentiment::Neutral, RiskLevel::Low, &up),
            LEAN_UP_TEXT
        );
        // contradicting trend leaves the call alone
        assert_eq!(
            recommendation(MarketSentiment::Bearish, RiskLevel::Low, &up),
            "建议减少黄金配置，市场情绪偏悲观"
        );
    }

    #[test]
    fn test_weak_trend_keeps_base() {
        let weak = trend(TrendDirection::Up, 0.5, 0.8, 0.3);
        assert_eq!(
            recommendation(MarketSentiment::Bullish, RiskLevel::Medium, &weak),
            "建议适度增加黄金配置"
        );
    }

    #[test]
    fn test_turbulence_overrides_directional_calls() {
        let wild = trend(TrendDirection::StrongUp, 0.9, 0.9, 0.85);
        assert_eq!(recommendation(MarketSentiment::VeryBullish, RiskLevel::Low, &wild), CAUTION_TEXT);
        assert_eq!(recommendation(MarketSentiment::Bearish, RiskLevel::High, &wild), CAUTION_TEXT);
        assert_eq!(
            recommendation(MarketSentiment::Neutral, RiskLevel::Low, &wild),
            "建议保持现有配置，市场情绪中性"
        );
    }

    #[test]
    fn test_time_horizon_adjustments() {
        let strong = trend(TrendDirection::Up, 0.8, 0.7, 0.2);
        let wild = trend(TrendDirection::Sideways, 0.1, 0.5, 0.9);

        assert_eq!(TimeHorizon::base(MarketSentiment::Bullish, RiskLevel::High), TimeHorizon::Short);
        assert_eq!(TimeHorizon::base(MarketSentiment::VeryBearish, RiskLevel::Low), TimeHorizon::ShortMedium);
        assert_eq!(TimeHorizon::Short.with_trend(&strong), TimeHorizon::ShortMedium);
        assert_eq!(TimeHorizon::Medium.with_trend(&strong), TimeHorizon::MediumLong);
        assert_eq!(TimeHorizon::Medium.with_trend(&wild), TimeHorizon::Short);
        assert_eq!(TimeHorizon::ShortMedium.with_trend(&wild), TimeHorizon::ShortMedium);
    }

    #[test]
    fn test_position_size_adjustments() {
        let calm = trend(TrendDirection::Up, 0.8, 0.7, 0.2);
        let erratic = trend(TrendDirection::Sideways, 0.1, 0.2, 0.4);

        assert_eq!(PositionSize::base(MarketSentiment::Neutral, RiskLevel::VeryHigh), PositionSize::Tiny);
        assert_eq!(PositionSize::base(MarketSentiment::VeryBullish, RiskLevel::Low), PositionSize::Moderate);
        assert_eq!(PositionSize::Tiny.with_trend(&calm), PositionSize::Small);
        assert_eq!(PositionSize::Small.with_trend(&calm), PositionSize::Moderate);
        assert_eq!(PositionSize::Balanced.with_trend(&erratic), PositionSize::Small);
        assert_eq!(PositionSize::Tiny.with_trend(&erratic), PositionSize::Tiny);
    }
}
