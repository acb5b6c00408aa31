//! Error Types

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Provider error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),
    
    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    
    /// Request timed out
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    
    /// Response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    
    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),
    
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
    
    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    
    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_)
                | Self::RateLimited(_)
                | Self::Timeout(_)
                | Self::Io(_)
        )
    }
    
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The sentiment service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => "The sentiment service is currently unavailable. Please try again.".into(),
            Self::Timeout(_) => "The sentiment service took too long to respond.".into(),
            Self::RateLimited(_) => "Too many requests to the sentiment service. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication failed. Please check API_KEY.".into(),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
