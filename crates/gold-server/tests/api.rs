//! Router tests driven through `tower::ServiceExt::oneshot`

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use gold_advisor::news::store;
use gold_advisor::{AnalyzerConfig, NewsItem, SentimentAnalyzer};
use gold_core::provider::{Completion, ModelInfo, ProviderInfo};
use gold_core::{GenerationOptions, LlmProvider, Message};
use gold_server::{app, AppState, ServerConfig};

struct BullishProvider;

#[async_trait]
impl LlmProvider for BullishProvider {
    async fn info(&self) -> gold_core::Result<ProviderInfo> {
        Ok(ProviderInfo { name: "bullish".into(), endpoint: String::new(), models: vec![] })
    }

    async fn health_check(&self) -> gold_core::Result<bool> {
        Ok(true)
    }

    async fn complete(&self, _messages: &[Message], options: &GenerationOptions) -> gold_core::Result<Completion> {
        Ok(Completion {
            content: r#"{"sentiment": "positive", "score": 0.7, "confidence": 0.9, "keywords": ["降息"], "reasoning": "利多"}"#.into(),
            model: options.model.clone(),
            usage: None,
            finish_reason: None,
        })
    }

    async fn list_models(&self) -> gold_core::Result<Vec<ModelInfo>> {
        Ok(vec![])
    }
}

fn router(dir: &TempDir, with_analyzer: bool) -> Router {
    let config = ServerConfig {
        data_dir: dir.path().to_path_buf(),
        cache_dir: None,
        live_prices: false,
        ..ServerConfig::default()
    };
    let analyzer = with_analyzer.then(|| {
        SentimentAnalyzer::new(Arc::new(BullishProvider), GenerationOptions::default(), AnalyzerConfig::uncached())
    });
    app(AppState::new(&config, analyzer))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(router: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_empty(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn seed_analyzed(dir: &TempDir) {
    let batch = json!([
        {"title": "美联储降息", "url": "https://x/content/1", "time": "2024-01-01",
         "sentiment_analysis": {"sentiment": "positive", "score": 0.7, "confidence": 0.8, "keywords": ["降息", "美联储"]}},
        {"title": "央行购金", "url": "https://x/content/2", "time": "2024-01-02",
         "sentiment_analysis": {"sentiment": "positive", "score": 0.5, "confidence": 0.7, "keywords": ["央行购金", "降息"]}},
        {"title": "金价震荡", "url": "https://x/content/3", "time": "2024-01-03",
         "sentiment_analysis": {"sentiment": "neutral", "score": 0.1, "confidence": 0.6, "keywords": ["震荡"]}}
    ]);
    let items = batch.as_array().cloned().unwrap();
    let at = NaiveDate::from_ymd_opt(2024, 1, 3)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    store::save_batch_at(dir.path(), store::ANALYZED_PREFIX, &items, at)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();

    let (status, body) = get(router(&dir, false), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["analyzer_configured"], false);

    let (_, body) = get(router(&dir, true), "/health").await;
    assert_eq!(body["provider_connected"], true);
}

#[tokio::test]
async fn test_empty_data_dir_serves_defaults() {
    let dir = TempDir::new().unwrap();

    let (status, advice) = get(router(&dir, false), "/api/advice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(advice["market_sentiment"], "neutral");
    assert_eq!(advice["risk_level"], "high");
    assert_eq!(advice["confidence_score"], 0.0);

    let (status, summary) = get(router(&dir, false), "/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_news"], 0);

    let (_, news) = get(router(&dir, false), "/api/news").await;
    assert_eq!(news["total"], 0);

    let (_, timeline) = get(router(&dir, false), "/api/timeline").await;
    assert_eq!(timeline["daily"], json!([]));
}

#[tokio::test]
async fn test_reads_latest_analyzed_batch() {
    let dir = TempDir::new().unwrap();
    seed_analyzed(&dir).await;

    let (_, advice) = get(router(&dir, false), "/api/advice").await;
    assert_eq!(advice["market_sentiment"], "bullish");

    let (_, news) = get(router(&dir, false), "/api/news?limit=2").await;
    assert_eq!(news["total"], 3);
    assert_eq!(news["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(news["items"][0]["title"], "美联储降息");

    let (_, overview) = get(router(&dir, false), "/api/overview").await;
    assert_eq!(overview["total_count"], 3);
    assert_eq!(overview["mood"], "optimistic");

    let (_, timeline) = get(router(&dir, false), "/api/timeline").await;
    assert_eq!(timeline["points"].as_array().map(Vec::len), Some(3));
    assert_eq!(timeline["daily"][0]["date"], "2024-01-01");
}

#[tokio::test]
async fn test_analyze_without_provider_is_unavailable() {
    let dir = TempDir::new().unwrap();

    let (status, body) = post_json(router(&dir, false), "/api/analyze", &json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "ANALYZER_DISABLED");
}

#[tokio::test]
async fn test_analyze_without_raw_batch_is_not_found() {
    let dir = TempDir::new().unwrap();

    let (status, body) = post_json(router(&dir, true), "/api/analyze", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NO_DATA");
}

#[tokio::test]
async fn test_analyze_persists_and_summarises() {
    let dir = TempDir::new().unwrap();
    let news = vec![
        NewsItem::new("美联储降息", "https://x/content/1", "2024-01-01"),
        NewsItem::new("央行购金", "https://x/content/2", "2024-01-02"),
        NewsItem::new("避险升温", "https://x/content/3", "2024-01-03"),
    ];
    store::save_batch(dir.path(), store::RAW_PREFIX, &news).await.unwrap();

    let (status, summary) = post_json(router(&dir, true), "/api/analyze", &json!({"limit": 2})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_news"], 2);
    assert_eq!(summary["market_sentiment"], "very_bullish");

    let saved = store::latest_batch(dir.path(), store::ANALYZED_PREFIX).await.unwrap();
    assert!(saved.is_some());

    let (_, listed) = get(router(&dir, false), "/api/news").await;
    assert_eq!(listed["total"], 2);
}

#[tokio::test]
async fn test_analyze_accepts_empty_body() {
    let dir = TempDir::new().unwrap();
    let news = vec![NewsItem::new("美联储降息", "https://x/content/1", "2024-01-01")];
    store::save_batch(dir.path(), store::RAW_PREFIX, &news).await.unwrap();

    let (status, summary) = post_empty(router(&dir, true), "/api/analyze").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_news"], 1);
}

#[tokio::test]
async fn test_keyword_counts() {
    let dir = TempDir::new().unwrap();

    let (status, empty) = get(router(&dir, false), "/api/keywords").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["keywords"], json!([]));

    seed_analyzed(&dir).await;
    let (_, all) = get(router(&dir, false), "/api/keywords?limit=2").await;
    assert_eq!(all["keywords"], json!([{"keyword": "降息", "count": 2}, {"keyword": "美联储", "count": 1}]));

    let (_, neutral) = get(router(&dir, false), "/api/keywords?sentiment=neutral").await;
    assert_eq!(neutral["sentiment"], "neutral");
    assert_eq!(neutral["keywords"], json!([{"keyword": "震荡", "count": 1}]));
}

#[tokio::test]
async fn test_price_panel() {
    let dir = TempDir::new().unwrap();

    let (status, body) = get(router(&dir, false), "/api/price?days=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"]["source"], "模拟数据");
    assert_eq!(body["history"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["statistics"]["current_price"], body["history"][6]["price_usd"]);

    let (_, clamped) = get(router(&dir, false), "/api/price?days=0").await;
    assert_eq!(clamped["history"].as_array().map(Vec::len), Some(1));
    assert_eq!(clamped["statistics"]["trend"], "undetermined");
}
