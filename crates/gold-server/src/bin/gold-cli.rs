//! Gold sentiment command line
//!
//! ```text
//! gold-cli crawl --target 50 --details 5 [--mock]
//! gold-cli analyze [--input FILE] [--limit N]
//! gold-cli advise [--input FILE] [--json]
//! gold-cli price [--days 30] [--offline]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gold_advisor::news::{store, CrawlerConfig, Fx678Config, Fx678Source, MockNewsSource, NewsCrawler, NewsSource};
use gold_advisor::price::{price_statistics, MetalsLiveConfig, MetalsLiveSource, MockPriceSource};
use gold_advisor::sentiment::keyword_frequency;
use gold_advisor::{InvestmentAdvice, InvestmentAdvisor, NewsItem, PriceFeed, PriceSource, SentimentRecord};
use gold_server::{analyzer_from_env, init_tracing, ServerConfig};

/// Keywords listed under the text advice
const ADVICE_KEYWORDS: usize = 10;

#[derive(Parser)]
#[command(version, about = "Gold news sentiment and investment advice")]
struct Cli {
    /// Batch directory (defaults to DATA_DIR)
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Crawl gold news and save a raw batch
    Crawl {
        /// Items to collect
        #[arg(long, default_value_t = 50)]
        target: usize,
        /// Items to enrich with article details
        #[arg(long, default_value_t = 5)]
        details: usize,
        /// Use built-in headlines instead of the live site
        #[arg(long)]
        mock: bool,
    },
    /// Score a raw batch and save the analysed batch
    Analyze {
        /// Raw batch (defaults to the newest one)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Analyse only the first N items
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print investment advice for an analysed batch
    Advise {
        /// Analysed batch (defaults to the newest one)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the gold price and its recent statistics
    Price {
        /// Days of history
        #[arg(long, default_value_t = 30)]
        days: usize,
        /// Skip the live source
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ServerConfig::from_env();
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());

    match cli.cmd {
        Cmd::Crawl { target, details, mock } => crawl(&data_dir, target, details, mock).await,
        Cmd::Analyze { input, limit } => analyze(&data_dir, input, limit).await,
        Cmd::Advise { input, json } => advise(&data_dir, input, json).await,
        Cmd::Price { days, offline } => price(&config, days, offline).await,
    }
}

async fn crawl(data_dir: &Path, target: usize, details: usize, mock: bool) -> Result<()> {
    let source: Arc<dyn NewsSource> = if mock {
        Arc::new(MockNewsSource::new())
    } else {
        Arc::new(Fx678Source::new(Fx678Config::default())?)
    };
    let config = if mock { CrawlerConfig::unthrottled() } else { CrawlerConfig::default() };

    let crawler = NewsCrawler::new(source, config);
    let news = crawler.crawl_with_details(target, details).await;
    if news.is_empty() {
        anyhow::bail!("no news collected from {}", crawler.source_name());
    }

    let path = store::save_batch(data_dir, store::RAW_PREFIX, &news).await?;
    println!("Saved {} items to {}", news.len(), path.display());
    Ok(())
}

async fn resolve(data_dir: &Path, input: Option<PathBuf>, prefix: &str) -> Result<PathBuf> {
    if let Some(path) = input {
        return Ok(path);
    }
    store::latest_batch(data_dir, prefix)
        .await?
        .with_context(|| format!("no {prefix}_*.json batch in {}", data_dir.display()))
}

async fn analyze(data_dir: &Path, input: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let analyzer = analyzer_from_env().context("sentiment analysis needs a configured provider")?;

    let path = resolve(data_dir, input, store::RAW_PREFIX).await?;
    let mut news: Vec<NewsItem> = store::load_batch(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    if let Some(limit) = limit {
        news.truncate(limit);
    }

    let analyzed = analyzer.analyze_batch(news).await;
    let saved = store::save_batch(data_dir, store::ANALYZED_PREFIX, &analyzed).await?;

    let records: Vec<SentimentRecord> = analyzed.iter().map(|a| a.to_record()).collect();
    let advice = InvestmentAdvisor::default().advise(&records);
    println!("Analysed {} items, saved to {}", analyzed.len(), saved.display());
    println!("{} / {} : {}", advice.market_sentiment.label(), advice.risk_level.label(), advice.recommendation);
    Ok(())
}

async fn advise(data_dir: &Path, input: Option<PathBuf>, json: bool) -> Result<()> {
    let records = match input {
        Some(path) => store::load_records(&path).await?,
        None => match store::latest_batch(data_dir, store::ANALYZED_PREFIX).await? {
            Some(path) => store::load_records(&path).await?,
            None => Vec::new(),
        },
    };

    let advice = InvestmentAdvisor::default().advise(&records);
    if json {
        println!("{}", serde_json::to_string_pretty(&advice)?);
    } else {
        print!("{}", render(&advice, records.len()));
        let keywords = keyword_frequency(&records, None, ADVICE_KEYWORDS);
        if !keywords.is_empty() {
            let line: Vec<String> = keywords.iter().map(|k| format!("{}({})", k.keyword, k.count)).collect();
            println!("热门关键词: {}", line.join(" "));
        }
    }
    Ok(())
}

async fn price(config: &ServerConfig, days: usize, offline: bool) -> Result<()> {
    let mut sources: Vec<Arc<dyn PriceSource>> = Vec::new();
    if config.live_prices && !offline {
        sources.push(Arc::new(MetalsLiveSource::new(MetalsLiveConfig::default())?));
    }
    sources.push(Arc::new(MockPriceSource::new()));

    let mut feed = PriceFeed::new(sources);
    if let Some(dir) = &config.cache_dir {
        feed = feed.with_cache_dir(dir);
    }

    let current = feed.current_price().await?;
    println!(
        "美元金价:   ${:.2} ({:+.2}, {:+.2}%)",
        current.price_usd, current.change_24h, current.change_percent_24h
    );
    println!("人民币金价: ¥{:.2}", current.price_cny);
    println!("数据源:     {}", current.source);
    println!("更新时间:   {}", current.timestamp.format("%Y-%m-%d %H:%M:%S"));

    let history = feed.historical_prices(days).await?;
    if let Some(stats) = price_statistics(&history) {
        println!();
        println!(
            "近 {} 天: 最高 ${:.2} / 最低 ${:.2} / 均价 ${:.2}",
            history.len(),
            stats.highest_price,
            stats.lowest_price,
            stats.average_price
        );
        println!("波动 {:.2}, 区间 {:.2}, {}", stats.volatility, stats.price_range, stats.trend.label());
    }
    Ok(())
}

fn render(advice: &InvestmentAdvice, count: usize) -> String {
    let trend = &advice.trend_analysis;
    let mut out = String::new();

    out.push_str(&format!("══ 黄金投资建议 ({count} 条新闻) ══\n"));
    out.push_str(&format!("市场情绪: {}\n", advice.market_sentiment.label()));
    out.push_str(&format!("风险等级: {}\n", advice.risk_level.label()));
    out.push_str(&format!("置信度:   {:.1}%\n", advice.confidence_score * 100.0));
    out.push_str(&format!("建议:     {}\n", advice.recommendation));
    out.push_str(&format!("投资期限: {}\n", advice.time_horizon));
    out.push_str(&format!("仓位:     {}\n\n", advice.position_sizing));
    out.push_str(&format!("分析: {}\n\n", advice.reasoning));
    out.push_str(&format!(
        "趋势: {} (强度 {:.2}, 一致性 {:.2}, 波动 {:.2}, {} 天)\n",
        trend.direction.label(),
        trend.strength,
        trend.consistency,
        trend.volatility,
        trend.duration
    ));
    out.push_str(&format!("{}\n\n", advice.trend_impact));

    out.push_str("操作建议:\n");
    for item in &advice.action_suggestions {
        out.push_str(&format!("  • {item}\n"));
    }
    out.push_str("风险提示:\n");
    for item in &advice.risk_warnings {
        out.push_str(&format!("  ⚠ {item}\n"));
    }
    out
}
