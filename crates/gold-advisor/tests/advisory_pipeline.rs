//! End-to-end checks of the advisory pipeline: crawl, score, persist,
//! reload and advise, plus batch-level properties of the advisory core.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use gold_advisor::analysis::{analyze_trend, risk_metrics, volume_risk};
use gold_advisor::config::TrendConfig;
use gold_advisor::news::{store, CrawlerConfig, MockNewsSource, NewsCrawler};
use gold_advisor::{
    default_advice, market_summary, AdvisorConfig, AnalyzerConfig, InvestmentAdvisor,
    MarketSentiment, RiskLevel, Sentiment, SentimentAnalyzer, SentimentRecord, TrendAnalysis,
    TrendDirection,
};
use gold_core::provider::{Completion, ModelInfo, ProviderInfo};
use gold_core::{GenerationOptions, LlmProvider, Message};
use tempfile::TempDir;

/// Scores headlines about falling prices as negative, everything else positive
struct KeywordProvider;

const BEARISH_WORDS: &[&str] = &["下挫", "获利了结", "转弱"];

#[async_trait]
impl LlmProvider for KeywordProvider {
    async fn info(&self) -> gold_core::Result<ProviderInfo> {
        Ok(ProviderInfo { name: "keyword".into(), endpoint: String::new(), models: vec![] })
    }

    async fn health_check(&self) -> gold_core::Result<bool> {
        Ok(true)
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> gold_core::Result<Completion> {
        let prompt = messages.iter().map(|m| m.content.as_str()).collect::<String>();
        let title = prompt
            .lines()
            .find(|line| line.starts_with("新闻标题"))
            .unwrap_or_default();

        let reply = if BEARISH_WORDS.iter().any(|w| title.contains(w)) {
            r#"```json
{"sentiment": "negative", "score": -0.5, "confidence": 0.7, "keywords": ["承压"], "reasoning": "利空"}
```"#
        } else {
            r#"{"sentiment": "positive", "score": 0.6, "confidence": 0.8, "keywords": ["避险"], "reasoning": "利多"}"#
        };

        Ok(Completion {
            content: reply.into(),
            model: options.model.clone(),
            usage: None,
            finish_reason: None,
        })
    }

    async fn list_models(&self) -> gold_core::Result<Vec<ModelInfo>> {
        Ok(vec![])
    }
}

fn record(day: u32, sentiment: Sentiment, score: f64, confidence: f64) -> SentimentRecord {
    SentimentRecord::new(format!("2024-01-{day:02}"), sentiment, score, confidence)
}

fn series(scores: &[f64]) -> Vec<SentimentRecord> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| record(i as u32 + 1, Sentiment::Neutral, *s, 0.7))
        .collect()
}

/// Deterministic pseudo-random scores in [-1, 1]
fn scrambled_scores(seed: u64, len: usize) -> Vec<f64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) * 2.0 - 1.0
        })
        .collect()
}

#[tokio::test]
async fn test_crawl_analyze_store_advise() {
    let dir = TempDir::new().unwrap();

    let crawler = NewsCrawler::new(Arc::new(MockNewsSource::new()), CrawlerConfig::unthrottled());
    let news = crawler.crawl_with_details(10, 3).await;
    assert_eq!(news.len(), 10);

    let raw_path = store::save_batch(dir.path(), store::RAW_PREFIX, &news).await.unwrap();
    let reloaded = store::load_batch(&raw_path).await.unwrap();
    assert_eq!(reloaded, news);

    let analyzer = SentimentAnalyzer::new(
        Arc::new(KeywordProvider),
        GenerationOptions::default(),
        AnalyzerConfig::uncached(),
    );
    let analyzed = analyzer.analyze_batch(reloaded).await;
    assert_eq!(analyzed.len(), 10);
    let negatives = analyzed
        .iter()
        .filter(|a| a.sentiment_analysis.sentiment == Sentiment::Negative)
        .count();
    assert_eq!(negatives, 2);

    store::save_batch(dir.path(), store::ANALYZED_PREFIX, &analyzed).await.unwrap();
    let latest = store::latest_batch(dir.path(), store::ANALYZED_PREFIX)
        .await
        .unwrap()
        .unwrap();
    let records = store::load_records(&latest).await.unwrap();
    assert_eq!(records.len(), 10);

    let config = AdvisorConfig::default();
    let advice = InvestmentAdvisor::new(config.clone()).advise(&records);
    assert_eq!(advice.market_sentiment, MarketSentiment::Bullish);
    assert!((0.0..=1.0).contains(&advice.confidence_score));
    assert!(!advice.recommendation.is_empty());
    assert!(!advice.action_suggestions.is_empty());

    let now = NaiveDate::from_ymd_opt(2024, 1, 16)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap();
    let summary = market_summary(&records, &config, now);
    assert_eq!(summary.total_news, 10);
    assert_eq!(summary.market_sentiment, advice.market_sentiment);
    assert_eq!(summary.risk_level, advice.risk_level);
    assert_eq!(summary.last_update, "2024-01-16 08:00:00");
}

#[test]
fn test_empty_batch_gets_default_advice() {
    let advice = InvestmentAdvisor::default().advise(&[]);

    assert_eq!(advice, default_advice());
    assert_eq!(advice.market_sentiment, MarketSentiment::Neutral);
    assert_eq!(advice.risk_level, RiskLevel::High);
    assert!(advice.confidence_score.abs() < f64::EPSILON);
}

#[test]
fn test_short_batches_have_flat_trend() {
    let config = TrendConfig::default();
    for len in 0..3 {
        let records = series(&scrambled_scores(len as u64 + 7, len));
        assert_eq!(analyze_trend(&records, &config), TrendAnalysis::flat());
    }
}

#[test]
fn test_outputs_stay_in_range() {
    let advisor = InvestmentAdvisor::default();

    for seed in 0..40u64 {
        let len = (seed as usize % 25) + 1;
        let records = series(&scrambled_scores(seed, len));
        let advice = advisor.advise(&records);
        let trend = &advice.trend_analysis;

        assert!((0.0..=1.0).contains(&trend.strength), "strength {}", trend.strength);
        assert!((0.0..=1.0).contains(&trend.consistency), "consistency {}", trend.consistency);
        assert!((0.0..=1.0).contains(&trend.volatility), "volatility {}", trend.volatility);
        assert!((-1.0..=1.0).contains(&trend.momentum), "momentum {}", trend.momentum);
        assert!((0.0..=1.0).contains(&advice.confidence_score));
        assert!(!advice.recommendation.is_empty());
    }
}

#[test]
fn test_rising_series_is_upward_and_strong() {
    let trend = analyze_trend(&series(&[-0.5, -0.3, -0.1, 0.2, 0.5]), &TrendConfig::default());

    assert!(matches!(trend.direction, TrendDirection::Up | TrendDirection::StrongUp));
    assert!(trend.strength > 0.8);
    assert_eq!(trend.duration, 5);
}

#[test]
fn test_constant_series_is_sideways() {
    let trend = analyze_trend(&series(&[0.2; 5]), &TrendConfig::default());

    assert_eq!(trend.direction, TrendDirection::Sideways);
    assert!(trend.volatility.abs() < 1e-12);
    assert!(trend.consistency.abs() < f64::EPSILON);
}

#[test]
fn test_three_record_bullish_batch() {
    let records = vec![
        record(1, Sentiment::Positive, 0.7, 0.8),
        record(2, Sentiment::Positive, 0.5, 0.7),
        record(3, Sentiment::Neutral, 0.1, 0.6),
    ];

    let advice = InvestmentAdvisor::default().advise(&records);
    assert_eq!(advice.market_sentiment, MarketSentiment::Bullish);

    let summary = market_summary(&records, &AdvisorConfig::default(), NaiveDate::MIN.and_hms_opt(0, 0, 0).unwrap());
    assert!((summary.average_sentiment_score - 0.433).abs() < 1e-9);

    // two classes split 2:1
    let metrics = risk_metrics(&records);
    let expected = -(2.0 / 3.0 * (2.0f64 / 3.0).log2() + 1.0 / 3.0 * (1.0f64 / 3.0).log2());
    assert!((metrics.consistency_risk - expected).abs() < 1e-9);
    assert!((metrics.volume_risk - 0.8).abs() < f64::EPSILON);
}

#[test]
fn test_advice_is_deterministic() {
    let records = series(&scrambled_scores(99, 12));
    let advisor = InvestmentAdvisor::default();

    let first = serde_json::to_string(&advisor.advise(&records)).unwrap();
    let second = serde_json::to_string(&advisor.advise(&records)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_volume_risk_boundaries() {
    for n in 1..=4 {
        assert!((volume_risk(n) - 0.8).abs() < f64::EPSILON, "size {n}");
    }
    assert!((volume_risk(5) - 0.2).abs() < f64::EPSILON);
    assert!((volume_risk(50) - 0.2).abs() < f64::EPSILON);
    assert!((volume_risk(51) - 0.6).abs() < f64::EPSILON);

    let crowded = series(&[0.1; 51]);
    assert!((risk_metrics(&crowded).volume_risk - 0.6).abs() < f64::EPSILON);
}
