//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gold_advisor::AdvisorError;
use gold_core::CoreError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sentiment analysis is not configured")]
    AnalyzerUnavailable,

    #[error("No news data: {0}")]
    NoData(String),

    #[error("Gold price unavailable: {0}")]
    PriceUnavailable(String),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    #[error(transparent)]
    Provider(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ServerError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AnalyzerUnavailable | Self::PriceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NoData(_) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Advisor(_) | Self::Provider(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::AnalyzerUnavailable => "ANALYZER_DISABLED",
            Self::NoData(_) => "NO_DATA",
            Self::PriceUnavailable(_) => "PRICE_UNAVAILABLE",
            Self::Advisor(_) => "ADVISOR_ERROR",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Message safe to show API clients
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(e) => e.user_message(),
            Self::AnalyzerUnavailable => "Sentiment analysis is disabled. Set API_KEY to enable it.".into(),
            Self::NoData(what) => format!("No {what} available yet"),
            Self::PriceUnavailable(_) => "Gold price data is unavailable. Please try again later.".into(),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Advisor(_) | Self::Io(_) => "An unexpected error occurred.".into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            error: self.user_message(),
            code: self.code().into(),
        };
        (self.status(), Json(body)).into_response()
    }
}
