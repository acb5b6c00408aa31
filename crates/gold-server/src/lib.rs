//! # gold-server
//!
//! HTTP dashboard API and command line front ends for `gold-advisor`.
//!
//! ```text
//! GET  /health         - status and provider connectivity
//! GET  /api/news       - latest analysed items (?limit=N)
//! GET  /api/advice     - investment advice
//! GET  /api/summary    - market summary
//! GET  /api/overview   - sentiment statistics
//! GET  /api/timeline   - score timeline and daily averages
//! GET  /api/keywords   - keyword frequency (?limit=N&sentiment=positive)
//! GET  /api/price      - gold quote, history and statistics (?days=N)
//! POST /api/analyze    - analyse the latest crawled batch
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::{analyzer_from_env, AppState};

/// Router with every endpoint, permissive CORS and request tracing
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/news", get(handlers::list_news))
        .route("/api/advice", get(handlers::advice))
        .route("/api/summary", get(handlers::summary))
        .route("/api/overview", get(handlers::overview))
        .route("/api/timeline", get(handlers::timeline))
        .route("/api/keywords", get(handlers::keywords))
        .route("/api/price", get(handlers::price))
        .route("/api/analyze", post(handlers::analyze))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Install the global subscriber (binaries only)
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config::log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
