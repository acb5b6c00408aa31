//! Domain Models
//!
//! News items, per-article sentiment, and the derived trend, risk and advice
//! values. Every enum serializes `snake_case` and exposes a Chinese `label()`
//! used in generated text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentiment class of a single article
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Case-insensitive parse; anything unknown is neutral
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "正面",
            Self::Negative => "负面",
            Self::Neutral => "中性",
        }
    }
}

/// One scored article as consumed by the advisory core
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    /// Raw time string, in any of the supported formats
    pub time: String,
    pub sentiment: Sentiment,
    /// In [-1, 1]
    pub score: f64,
    /// In [0, 1]
    pub confidence: f64,
    pub keywords: Vec<String>,
}

impl SentimentRecord {
    /// Build a record, clamping score and confidence into range
    pub fn new(time: impl Into<String>, sentiment: Sentiment, score: f64, confidence: f64) -> Self {
        Self {
            time: time.into(),
            sentiment,
            score: clamp_or_zero(score, -1.0, 1.0),
            confidence: clamp_or_zero(confidence, 0.0, 1.0),
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Read a record from an analysed news item.
    ///
    /// Never fails: a missing or malformed `sentiment_analysis` object, or
    /// any of its fields, falls back to score 0, confidence 0, neutral.
    pub fn from_value(item: &Value) -> Self {
        let time = item
            .get("time")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let analysis = item.get("sentiment_analysis").filter(|v| v.is_object());

        let Some(analysis) = analysis else {
            return Self::new(time, Sentiment::Neutral, 0.0, 0.0);
        };

        let sentiment = analysis
            .get("sentiment")
            .and_then(Value::as_str)
            .map(Sentiment::parse_lenient)
            .unwrap_or_default();
        let score = lenient_number(analysis.get("score")).unwrap_or(0.0);
        let confidence = lenient_number(analysis.get("confidence")).unwrap_or(0.0);
        let keywords = analysis
            .get("keywords")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self::new(time, sentiment, score, confidence).with_keywords(keywords)
    }
}

/// Accept JSON numbers and numeric strings; reject non-finite values
pub(crate) fn lenient_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Clamp into `[lo, hi]`, mapping NaN to 0
pub(crate) fn clamp_or_zero(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(lo, hi) }
}

/// Sentiment verdict returned by the analysis service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    /// RFC 3339 timestamp of the analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl SentimentAnalysis {
    /// Neutral verdict carrying an explanation
    pub fn neutral(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.0,
            confidence,
            keywords: Vec::new(),
            reasoning: reasoning.into(),
            analyzed_at: None,
            cache_key: None,
        }
    }
}

/// A crawled news item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// List-page date, usually `YYYY-MM-DD`
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub crawl_time: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub publish_time: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            time: time.into(),
            ..Default::default()
        }
    }
}

/// Article detail page contents
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDetail {
    pub url: String,
    pub title: String,
    pub content: String,
    pub publish_time: String,
    pub author: String,
    pub tags: Vec<String>,
}

/// A news item together with its sentiment verdict
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedNews {
    #[serde(flatten)]
    pub news: NewsItem,
    pub sentiment_analysis: SentimentAnalysis,
}

impl AnalyzedNews {
    pub fn to_record(&self) -> SentimentRecord {
        let analysis = &self.sentiment_analysis;
        SentimentRecord::new(
            self.news.time.clone(),
            analysis.sentiment,
            analysis.score,
            analysis.confidence,
        )
        .with_keywords(analysis.keywords.clone())
    }
}

/// Direction of the sentiment trend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    StrongUp,
    Up,
    #[default]
    Sideways,
    Down,
    StrongDown,
}

impl TrendDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongUp => "强烈上升",
            Self::Up => "温和上升",
            Self::Sideways => "横盘整理",
            Self::Down => "温和下降",
            Self::StrongDown => "强烈下降",
        }
    }

    pub const fn is_upward(self) -> bool {
        matches!(self, Self::StrongUp | Self::Up)
    }

    pub const fn is_downward(self) -> bool {
        matches!(self, Self::StrongDown | Self::Down)
    }
}

/// Statistics of the time-ordered score series
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// R² of the linear fit, in [0, 1]
    pub strength: f64,
    /// Days spanned by the series
    pub duration: u32,
    /// In [-1, 1]
    pub momentum: f64,
    /// Population std of scores, in [0, 1]
    pub volatility: f64,
    /// Share of agreeing directional moves, in [0, 1]
    pub consistency: f64,
    pub recent_change: f64,
}

impl TrendAnalysis {
    /// Result for batches too small to analyse
    pub const fn flat() -> Self {
        Self {
            direction: TrendDirection::Sideways,
            strength: 0.0,
            duration: 0,
            momentum: 0.0,
            volatility: 0.0,
            consistency: 0.0,
            recent_change: 0.0,
        }
    }
}

/// Counts per sentiment class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn from_records(records: &[SentimentRecord]) -> Self {
        let mut dist = Self::default();
        for record in records {
            dist.record(record.sentiment);
        }
        dist
    }

    pub const fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub const fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub const fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Classes in fixed order: positive, negative, neutral
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, usize)> + '_ {
        [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
            .into_iter()
            .map(|s| (s, self.count(s)))
    }

    /// Number of classes with at least one record
    pub fn distinct(&self) -> usize {
        self.iter().filter(|(_, n)| *n > 0).count()
    }

    /// Most frequent class; ties go to the earlier class in `iter()` order
    pub fn dominant(&self) -> Option<(Sentiment, usize)> {
        self.iter().fold(None, |best, (s, n)| match best {
            _ if n == 0 => best,
            Some((_, m)) if m >= n => best,
            _ => Some((s, n)),
        })
    }
}

/// Risk scalars for a batch
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub sentiment_volatility: f64,
    pub confidence_risk: f64,
    pub volume_risk: f64,
    pub consistency_risk: f64,
    pub avg_confidence: f64,
    pub news_count: usize,
    pub sentiment_distribution: SentimentDistribution,
}

/// Five-level market mood
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSentiment {
    VeryBullish,
    Bullish,
    #[default]
    Neutral,
    Bearish,
    VeryBearish,
}

impl MarketSentiment {
    pub const ALL: [Self; 5] = [
        Self::VeryBullish,
        Self::Bullish,
        Self::Neutral,
        Self::Bearish,
        Self::VeryBearish,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryBullish => "强烈看涨",
            Self::Bullish => "温和看涨",
            Self::Neutral => "中性观望",
            Self::Bearish => "温和看跌",
            Self::VeryBearish => "强烈看跌",
        }
    }

    pub const fn is_bullish(self) -> bool {
        matches!(self, Self::VeryBullish | Self::Bullish)
    }

    pub const fn is_bearish(self) -> bool {
        matches!(self, Self::VeryBearish | Self::Bearish)
    }

    pub const fn is_extreme(self) -> bool {
        matches!(self, Self::VeryBullish | Self::VeryBearish)
    }
}

/// Four-level risk tier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    #[default]
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "低风险",
            Self::Medium => "中等风险",
            Self::High => "高风险",
            Self::VeryHigh => "极高风险",
        }
    }

    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::VeryHigh)
    }
}

/// Complete advice for one batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAdvice {
    pub market_sentiment: MarketSentiment,
    pub risk_level: RiskLevel,
    /// In [0, 1], three decimals
    pub confidence_score: f64,
    pub recommendation: String,
    pub reasoning: String,
    pub action_suggestions: Vec<String>,
    pub risk_warnings: Vec<String>,
    pub time_horizon: String,
    pub position_sizing: String,
    pub trend_analysis: TrendAnalysis,
    pub trend_impact: String,
}

/// Dashboard headline figures
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_news: usize,
    pub market_sentiment: MarketSentiment,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub average_sentiment_score: f64,
    pub recommendation: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub last_update: String,
}
