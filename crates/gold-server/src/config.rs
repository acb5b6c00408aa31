//! Server Configuration

use std::path::PathBuf;

use crate::error::{Result, ServerError};

/// Items shown by `GET /api/news` when no limit is given
pub const DEFAULT_NEWS_LIMIT: usize = 5;

/// Keywords listed by `GET /api/keywords` when no limit is given
pub const DEFAULT_KEYWORD_LIMIT: usize = 20;

/// Days of history for `GET /api/price`, default and upper bound
pub const DEFAULT_PRICE_DAYS: usize = 30;
pub const MAX_PRICE_DAYS: usize = 365;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Directory holding raw and analysed news batches
    pub data_dir: PathBuf,

    /// Listen address
    pub bind_addr: String,

    /// Price cache directory; `None` disables caching
    pub cache_dir: Option<PathBuf>,

    /// Ask metals.live before falling back to mock quotes
    pub live_prices: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./gold_news_data"),
            bind_addr: "0.0.0.0:8501".into(),
            cache_dir: Some(PathBuf::from("./cache")),
            live_prices: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            data_dir: std::env::var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cache_dir: std::env::var("CACHE_DIR").map(PathBuf::from).ok().or(defaults.cache_dir),
            live_prices: std::env::var("GOLD_PRICE_LIVE")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.live_prices),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            problems.push("DATA_DIR is empty");
        }
        if self.bind_addr.trim().is_empty() {
            problems.push("BIND_ADDR is empty");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Config(problems.join("; ")))
        }
    }
}

/// `0`, `false`, `no` and `off` disable; anything else enables
fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Subscriber filter: `RUST_LOG`, else `LOG_LEVEL`, else `info`
pub fn log_filter() -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| "info,tower_http=debug".into())
}
