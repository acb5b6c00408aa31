//! Error Types for Gold Advisor

use gold_core::{CoreError, Retryable};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    
    #[error("News source error: {0}")]
    NewsSource(String),

    #[error("Price source error: {0}")]
    PriceSource(String),
    
    #[error("Parse error: {0}")]
    Parse(String),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    
    #[error("Configuration error: {0}")]
    Config(String),
    
    #[error("Provider error: {0}")]
    Provider(#[from] CoreError),
}

impl Retryable for AdvisorError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Io(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}
