//! Fallback chain over price sources
//!
//! Sources are asked in order and the first answer wins. Good answers are
//! written to the file cache; when every source fails, a still-fresh
//! cached spot quote is served with its source marked as cached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{GoldPrice, PriceSource};
use crate::error::{AdvisorError, Result};
use crate::sentiment::FileCache;

/// Age after which a cached spot quote is no longer served
pub const CURRENT_TTL: Duration = Duration::from_secs(5 * 60);
/// Age after which cached daily history is rebuilt
pub const HISTORY_TTL: Duration = Duration::from_secs(60 * 60);

const CACHE_NAMESPACE: &str = "gold_price";
const CURRENT_KEY: &str = "current";
const HISTORY_KEY: &str = "historical";
const CACHED_SUFFIX: &str = " (缓存)";

pub struct PriceFeed {
    sources: Vec<Arc<dyn PriceSource>>,
    current_cache: Option<FileCache>,
    history_cache: Option<FileCache>,
}

impl PriceFeed {
    /// Uncached chain
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self {
            sources,
            current_cache: None,
            history_cache: None,
        }
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.current_cache = Some(FileCache::new(dir.clone(), CURRENT_TTL));
        self.history_cache = Some(FileCache::new(dir, HISTORY_TTL));
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Spot quote from the first source that answers, else the cached one
    pub async fn current_price(&self) -> Result<GoldPrice> {
        for source in &self.sources {
            match source.current_price().await {
                Ok(price) => {
                    if let Some(cache) = &self.current_cache {
                        cache.put(CACHE_NAMESPACE, CURRENT_KEY, &price).await;
                    }
                    return Ok(price);
                }
                Err(e) => tracing::warn!("Price source {} failed: {}", source.name(), e),
            }
        }

        if let Some(cache) = &self.current_cache {
            if let Some(mut price) = cache.get::<GoldPrice>(CACHE_NAMESPACE, CURRENT_KEY).await {
                tracing::info!("Serving cached gold price from {}", price.timestamp);
                price.source.push_str(CACHED_SUFFIX);
                return Ok(price);
            }
        }

        Err(AdvisorError::PriceSource("no price source answered".into()))
    }

    /// The last `days` daily quotes, oldest first. A fresh cached history
    /// is reused when it is long enough.
    pub async fn historical_prices(&self, days: usize) -> Result<Vec<GoldPrice>> {
        if days == 0 {
            return Ok(Vec::new());
        }

        if let Some(cache) = &self.history_cache {
            if let Some(cached) = cache.get::<Vec<GoldPrice>>(CACHE_NAMESPACE, HISTORY_KEY).await {
                if cached.len() >= days {
                    return Ok(cached[cached.len() - days..].to_vec());
                }
            }
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.historical_prices(days).await {
                Ok(history) => {
                    if let Some(cache) = &self.history_cache {
                        cache.put(CACHE_NAMESPACE, HISTORY_KEY, &history).await;
                    }
                    return Ok(history);
                }
                Err(e) => {
                    tracing::debug!("No history from {}: {}", source.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AdvisorError::PriceSource("no price sources configured".into())))
    }
}
