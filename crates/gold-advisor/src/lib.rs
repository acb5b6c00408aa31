//! # gold-advisor
//!
//! Gold-market investment advice derived from news sentiment.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ NewsCrawler  │──►│ SentimentAnalyzer│──►│ analysis         │──►│ InvestmentAdvisor│
//! │ (fx678/mock) │   │ (LLM + file TTL) │   │ risk/trend/class │   │ rule tables      │
//! └──────┬───────┘   └────────┬─────────┘   └──────────────────┘   └──────────────────┘
//!        │ gold_news_*.json   │ sentiment_analysis_*.json
//!        └────────► news::store ◄─────────┘
//! ```
//!
//! `price` feeds the dashboard price panel and is independent of the
//! pipeline above.
//!
//! The advisory core (`analysis` and `advice`) is pure: the same batch and
//! configuration always produce the same `InvestmentAdvice`.

pub mod advice;
pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod news;
pub mod price;
pub mod sentiment;

pub use advice::{default_advice, market_summary, InvestmentAdvisor};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use model::{
    AnalyzedNews, InvestmentAdvice, MarketSentiment, MarketSummary, NewsDetail, NewsItem,
    RiskLevel, RiskMetrics, Sentiment, SentimentAnalysis, SentimentRecord, TrendAnalysis,
    TrendDirection,
};
pub use news::{NewsCrawler, NewsSource};
pub use price::{GoldPrice, PriceFeed, PriceSource, PriceStatistics};
pub use sentiment::{AnalyzerConfig, SentimentAnalyzer, SentimentOverview};
