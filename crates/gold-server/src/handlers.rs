//! HTTP Handlers
//!
//! Every read endpoint works off the newest analysed batch in the data
//! directory. A missing or unreadable batch is served as an empty one.

use std::path::Path;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gold_advisor::news::store;
use gold_advisor::price::price_statistics;
use gold_advisor::sentiment::{
    daily_sentiment, keyword_frequency, sentiment_timeline, DailySentiment, KeywordCount, TimelinePoint,
};
use gold_advisor::{
    market_summary, GoldPrice, InvestmentAdvice, MarketSummary, NewsItem, PriceStatistics, Sentiment,
    SentimentOverview, SentimentRecord,
};

use crate::config::{DEFAULT_KEYWORD_LIMIT, DEFAULT_NEWS_LIMIT, DEFAULT_PRICE_DAYS, MAX_PRICE_DAYS};
use crate::error::ServerError;
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub analyzer_configured: bool,
    pub provider_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    /// Items in the batch, before the limit
    pub total: usize,
    pub items: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub points: Vec<TimelinePoint>,
    pub daily: Vec<DailySentiment>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    /// Only count keywords of this sentiment class
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub sentiment: Option<Sentiment>,
    pub keywords: Vec<KeywordCount>,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub days: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub current: GoldPrice,
    /// Daily quotes, oldest first
    pub history: Vec<GoldPrice>,
    pub statistics: Option<PriceStatistics>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Analyse only the first `limit` raw items
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// Batch loading
// ============================================================================

async fn latest_analyzed(dir: &Path) -> Option<std::path::PathBuf> {
    match store::latest_batch(dir, store::ANALYZED_PREFIX).await {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", dir.display(), e);
            None
        }
    }
}

/// Records of the newest analysed batch, empty when there is none
async fn latest_records(dir: &Path) -> Vec<SentimentRecord> {
    let Some(path) = latest_analyzed(dir).await else {
        return Vec::new();
    };
    store::load_records(&path).await.unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable batch {}: {}", path.display(), e);
        Vec::new()
    })
}

async fn latest_items(dir: &Path) -> Vec<Value> {
    let Some(path) = latest_analyzed(dir).await else {
        return Vec::new();
    };
    store::load_batch::<Value>(&path).await.unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable batch {}: {}", path.display(), e);
        Vec::new()
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = match &state.analyzer {
        Some(analyzer) => analyzer.health_check().await,
        None => false,
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        analyzer_configured: state.analyzer.is_some(),
        provider_connected,
    })
}

/// Latest analysed news items
pub async fn list_news(State(state): State<AppState>, Query(query): Query<NewsQuery>) -> Json<NewsResponse> {
    let mut items = latest_items(&state.data_dir).await;
    let total = items.len();
    items.truncate(query.limit.unwrap_or(DEFAULT_NEWS_LIMIT));

    Json(NewsResponse { total, items })
}

/// Full advice for the latest batch
pub async fn advice(State(state): State<AppState>) -> Json<InvestmentAdvice> {
    let records = latest_records(&state.data_dir).await;
    Json(state.advisor.advise(&records))
}

/// Dashboard headline figures
pub async fn summary(State(state): State<AppState>) -> Json<MarketSummary> {
    let records = latest_records(&state.data_dir).await;
    Json(market_summary(&records, state.advisor.config(), Local::now().naive_local()))
}

/// Descriptive statistics
pub async fn overview(State(state): State<AppState>) -> Json<SentimentOverview> {
    let records = latest_records(&state.data_dir).await;
    Json(SentimentOverview::from_records(&records))
}

/// Score timeline and daily averages
pub async fn timeline(State(state): State<AppState>) -> Json<TimelineResponse> {
    let records = latest_records(&state.data_dir).await;
    Json(TimelineResponse {
        points: sentiment_timeline(&records),
        daily: daily_sentiment(&records),
    })
}

/// Most frequent keywords of the latest batch
pub async fn keywords(State(state): State<AppState>, Query(query): Query<KeywordQuery>) -> Json<KeywordsResponse> {
    let records = latest_records(&state.data_dir).await;
    let limit = query.limit.unwrap_or(DEFAULT_KEYWORD_LIMIT);

    Json(KeywordsResponse {
        sentiment: query.sentiment,
        keywords: keyword_frequency(&records, query.sentiment, limit),
    })
}

/// Spot quote, daily history and its statistics
pub async fn price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ServerError> {
    let current = state
        .prices
        .current_price()
        .await
        .map_err(|e| ServerError::PriceUnavailable(e.to_string()))?;

    let days = query.days.unwrap_or(DEFAULT_PRICE_DAYS).clamp(1, MAX_PRICE_DAYS);
    let history = state.prices.historical_prices(days).await.unwrap_or_else(|e| {
        tracing::warn!("No gold price history: {}", e);
        Vec::new()
    });
    let statistics = price_statistics(&history);

    Ok(Json(PriceResponse { current, history, statistics }))
}

/// Analyse the newest raw batch, persist the result and summarise it.
/// The body is optional.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Option<Json<AnalyzeRequest>>,
) -> Result<Json<MarketSummary>, ServerError> {
    let Json(payload) = payload.unwrap_or_default();
    let analyzer = state.analyzer.as_ref().ok_or(ServerError::AnalyzerUnavailable)?;

    let raw_path = store::latest_batch(&state.data_dir, store::RAW_PREFIX)
        .await?
        .ok_or_else(|| ServerError::NoData("crawled news".into()))?;

    let mut news: Vec<NewsItem> = store::load_batch(&raw_path).await?;
    if let Some(limit) = payload.limit {
        news.truncate(limit);
    }
    tracing::info!("Analyzing {} items from {}", news.len(), raw_path.display());

    let analyzed = analyzer.analyze_batch(news).await;
    store::save_batch(&state.data_dir, store::ANALYZED_PREFIX, &analyzed).await?;

    let records: Vec<SentimentRecord> = analyzed.iter().map(|a| a.to_record()).collect();
    Ok(Json(market_summary(&records, state.advisor.config(), Local::now().naive_local())))
}
