//! Application State

use std::path::PathBuf;
use std::sync::Arc;

use gold_advisor::price::{MetalsLiveConfig, MetalsLiveSource, MockPriceSource};
use gold_advisor::{AdvisorConfig, AnalyzerConfig, InvestmentAdvisor, PriceFeed, PriceSource, SentimentAnalyzer};
use gold_core::{GenerationOptions, LlmProvider};
use gold_runtime::{OpenAiCompatConfig, OpenAiCompatProvider};

use crate::config::ServerConfig;
use crate::error::Result;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Directory holding raw and analysed news batches
    pub data_dir: Arc<PathBuf>,

    /// Advisory core over the default thresholds
    pub advisor: Arc<InvestmentAdvisor>,

    /// Sentiment analyzer (optional - None if no API key is configured)
    pub analyzer: Option<Arc<SentimentAnalyzer>>,

    /// Gold quotes for the price panel
    pub prices: Arc<PriceFeed>,
}

impl AppState {
    pub fn new(config: &ServerConfig, analyzer: Option<SentimentAnalyzer>) -> Self {
        Self {
            data_dir: Arc::new(config.data_dir.clone()),
            advisor: Arc::new(InvestmentAdvisor::new(AdvisorConfig::default())),
            analyzer: analyzer.map(Arc::new),
            prices: Arc::new(price_feed(config)),
        }
    }
}

/// Live source when enabled, mock quotes last so the panel always has data
fn price_feed(config: &ServerConfig) -> PriceFeed {
    let mut sources: Vec<Arc<dyn PriceSource>> = Vec::new();
    if config.live_prices {
        match MetalsLiveSource::new(MetalsLiveConfig::default()) {
            Ok(source) => sources.push(Arc::new(source)),
            Err(e) => tracing::warn!("Live gold prices disabled: {}", e),
        }
    }
    sources.push(Arc::new(MockPriceSource::new()));

    let feed = PriceFeed::new(sources);
    match &config.cache_dir {
        Some(dir) => feed.with_cache_dir(dir),
        None => feed,
    }
}

/// Analyzer wired to the OpenAI-compatible provider described by the
/// environment. Fails when the provider or analyzer settings are invalid.
pub fn analyzer_from_env() -> Result<SentimentAnalyzer> {
    let provider_config = OpenAiCompatConfig::from_env();
    let options = GenerationOptions::for_model(provider_config.model.clone());
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::from_config(provider_config)?);

    let analyzer_config = AnalyzerConfig::from_env();
    analyzer_config.validate()?;

    Ok(SentimentAnalyzer::new(provider, options, analyzer_config))
}
