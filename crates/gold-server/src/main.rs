//! Gold Sentiment Dashboard Server
//!
//! Axum-based server exposing news, sentiment statistics and investment
//! advice computed from the batches in `DATA_DIR`.

use gold_server::{analyzer_from_env, app, init_tracing, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before the filter reads LOG_LEVEL
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    config.validate()?;

    let analyzer = match analyzer_from_env() {
        Ok(analyzer) => {
            if analyzer.health_check().await {
                tracing::info!("✓ Sentiment provider reachable");
            } else {
                tracing::warn!("⚠ Sentiment provider not reachable - analysis requests may fail");
            }
            Some(analyzer)
        }
        Err(e) => {
            tracing::warn!("⚠ Sentiment analysis disabled: {}", e);
            tracing::warn!("  Set API_KEY (and optionally API_BASE_URL, MODEL_NAME) in .env");
            None
        }
    };

    let state = AppState::new(&config, analyzer);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 gold sentiment server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health        - Health check");
    tracing::info!("  GET  /api/news      - Latest analysed news");
    tracing::info!("  GET  /api/advice    - Investment advice");
    tracing::info!("  GET  /api/summary   - Market summary");
    tracing::info!("  GET  /api/overview  - Sentiment statistics");
    tracing::info!("  GET  /api/timeline  - Sentiment timeline");
    tracing::info!("  GET  /api/keywords  - Keyword frequency");
    tracing::info!("  GET  /api/price     - Gold price panel");
    tracing::info!("  POST /api/analyze   - Analyse latest crawl");

    axum::serve(listener, router).await?;

    Ok(())
}
