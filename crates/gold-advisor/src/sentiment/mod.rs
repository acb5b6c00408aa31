//! Sentiment Analysis Service
//!
//! Scores news articles through an `LlmProvider`, with a TTL file cache in
//! front of the provider and lenient parsing behind it. Failures never
//! abort a batch: they become neutral verdicts explaining what went wrong.

mod cache;
mod parse;
mod summary;

pub use cache::FileCache;
pub use parse::{extract_json, parse_sentiment_response, PARSE_FAILURE_CONFIDENCE};
pub use summary::{
    daily_sentiment, keyword_frequency, sentiment_timeline, DailySentiment, KeywordCount, Mood, SentimentOverview,
    TimelinePoint,
};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gold_core::{GenerationOptions, LlmProvider, Message};
use sha2::{Digest, Sha256};

use crate::error::{AdvisorError, Result};
use crate::model::{AnalyzedNews, NewsItem, SentimentAnalysis};

const CACHE_NAMESPACE: &str = "sentiment";

/// Analyzer settings
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Cache directory; `None` disables caching
    pub cache_dir: Option<PathBuf>,
    pub cache_days: u64,
    /// Progress is logged once per this many articles
    pub batch_size: usize,
    /// Pause between provider calls within a batch
    pub call_delay: Duration,
    /// Content is cut to this many characters before prompting
    pub max_content_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cache_dir: Some(PathBuf::from("./cache")),
            cache_days: 7,
            batch_size: 10,
            call_delay: Duration::from_secs(1),
            max_content_chars: 1000,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cache_dir = std::env::var("CACHE_DIR").map(PathBuf::from).ok().or(defaults.cache_dir);
        let cache_days = std::env::var("SENTIMENT_CACHE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_days);
        let batch_size = std::env::var("SENTIMENT_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.batch_size);

        Self {
            cache_dir,
            cache_days,
            batch_size,
            ..defaults
        }
    }

    /// Settings for tests: no cache, no delay
    pub fn uncached() -> Self {
        Self {
            cache_dir: None,
            call_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.batch_size == 0 {
            problems.push("SENTIMENT_BATCH_SIZE must be positive");
        }
        if self.max_content_chars == 0 {
            problems.push("content limit must be positive");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::Config(problems.join("; ")))
        }
    }
}

/// Cache key: SHA-256 hex of `"{title}_{content}"`
pub fn cache_key(title: &str, content: &str) -> String {
    let digest = Sha256::digest(format!("{title}_{content}").as_bytes());
    hex::encode(digest)
}

/// Prompt sent for one article; content is cut to `max_chars` characters
pub fn build_prompt(title: &str, content: &str, max_chars: usize) -> String {
    let content: String = content.chars().take(max_chars).collect();
    format!(
        r#"你是一个专业的金融分析师，请分析以下黄金相关新闻的情感倾向。

新闻标题：{title}
新闻内容：{content}

请从以下维度进行分析：
1. 对黄金价格的影响倾向（正面/负面/中性）
2. 情感强度（-1到1的数值，-1表示最负面，1表示最正面，0表示中性）
3. 关键影响因素和关键词
4. 分析的置信度（0到1之间）
5. 简要分析理由

请严格按照以下JSON格式返回结果，不要包含任何其他文字：
{{
    "sentiment": "positive/negative/neutral",
    "score": 0.0,
    "confidence": 0.0,
    "keywords": ["关键词1", "关键词2"],
    "reasoning": "分析理由"
}}
"#
    )
}

/// Scores articles through an LLM provider
pub struct SentimentAnalyzer {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    config: AnalyzerConfig,
    cache: Option<FileCache>,
}

impl SentimentAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions, config: AnalyzerConfig) -> Self {
        let cache = config
            .cache_dir
            .as_ref()
            .map(|dir| FileCache::with_days(dir, config.cache_days));

        Self {
            provider,
            options,
            config,
            cache,
        }
    }

    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Provider connectivity
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }

    /// Score one article
    pub async fn analyze(&self, title: &str, content: &str) -> SentimentAnalysis {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() && content.is_empty() {
            return SentimentAnalysis::neutral(0.0, "标题和内容都为空");
        }

        let key = cache_key(title, content);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get::<SentimentAnalysis>(CACHE_NAMESPACE, &key).await {
                tracing::debug!("Sentiment cache hit: {}", key);
                return hit;
            }
        }

        let preview: String = title.chars().take(50).collect();
        tracing::info!("Analyzing sentiment: {}...", preview);

        let mut analysis = match self.request(title, content).await {
            Ok(reply) if reply.trim().is_empty() => {
                tracing::error!("Provider returned an empty reply");
                let mut empty = SentimentAnalysis::neutral(0.0, "API返回空响应");
                empty.analyzed_at = Some(Utc::now().to_rfc3339());
                empty.cache_key = Some(key);
                return empty;
            }
            Ok(reply) => parse_sentiment_response(&reply),
            Err(e) => {
                tracing::error!("Sentiment analysis failed: {}", e);
                let mut failed = SentimentAnalysis::neutral(0.0, format!("分析失败: {e}"));
                failed.analyzed_at = Some(Utc::now().to_rfc3339());
                failed.cache_key = Some(key);
                return failed;
            }
        };

        analysis.analyzed_at = Some(Utc::now().to_rfc3339());
        analysis.cache_key = Some(key.clone());

        if let Some(cache) = &self.cache {
            cache.put(CACHE_NAMESPACE, &key, &analysis).await;
        }

        tracing::info!("Analysis complete: {} ({:.2})", analysis.sentiment.as_str(), analysis.score);
        analysis
    }

    async fn request(&self, title: &str, content: &str) -> Result<String> {
        let prompt = build_prompt(title, content, self.config.max_content_chars);
        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &self.options)
            .await?;
        Ok(completion.content)
    }

    /// Score a batch sequentially, pausing between calls. Output order
    /// matches input order.
    pub async fn analyze_batch(&self, news: Vec<NewsItem>) -> Vec<AnalyzedNews> {
        let total = news.len();
        let progress_every = self.config.batch_size.max(1);
        let mut results = Vec::with_capacity(total);

        tracing::info!("Analyzing {} news items", total);

        for (i, item) in news.into_iter().enumerate() {
            let sentiment_analysis = self.analyze(&item.title, &item.content).await;
            results.push(AnalyzedNews {
                news: item,
                sentiment_analysis,
            });

            let done = i + 1;
            if done % progress_every == 0 || done == total {
                tracing::info!("Progress: {}/{}", done, total);
            }

            if done < total && !self.config.call_delay.is_zero() {
                tokio::time::sleep(self.config.call_delay).await;
            }
        }

        tracing::info!("Batch analysis complete: {} items", results.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gold_core::provider::{Completion, ModelInfo, ProviderInfo};
    use gold_core::CoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    use crate::model::Sentiment;

    /// Replies with a fixed script, counting calls
    struct ScriptedProvider {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(text.into()), calls: AtomicUsize::new(0) })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self { reply: Err(message.into()), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> gold_core::Result<ProviderInfo> {
            Ok(ProviderInfo { name: "scripted".into(), endpoint: String::new(), models: vec![] })
        }

        async fn health_check(&self) -> gold_core::Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> gold_core::Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(messages.len(), 1);
            match &self.reply {
                Ok(text) => Ok(Completion {
                    content: text.clone(),
                    model: options.model.clone(),
                    usage: None,
                    finish_reason: None,
                }),
                Err(message) => Err(CoreError::ProviderUnavailable(message.clone())),
            }
        }

        async fn list_models(&self) -> gold_core::Result<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    const POSITIVE: &str = r#"{"sentiment": "positive", "score": 0.6, "confidence": 0.8, "keywords": ["避险"], "reasoning": "避险需求上升"}"#;

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let provider = ScriptedProvider::replying(POSITIVE);
        let analyzer = SentimentAnalyzer::new(provider.clone(), GenerationOptions::default(), AnalyzerConfig::uncached());

        let analysis = analyzer.analyze("  ", "").await;
        assert_eq!(analysis.reasoning, "标题和内容都为空");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_neutral() {
        let provider = ScriptedProvider::failing("connection refused");
        let analyzer = SentimentAnalyzer::new(provider, GenerationOptions::default(), AnalyzerConfig::uncached());

        let analysis = analyzer.analyze("金价", "内容").await;
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(analysis.confidence.abs() < f64::EPSILON);
        assert!(analysis.reasoning.starts_with("分析失败"));
        assert_eq!(analysis.cache_key, Some(cache_key("金价", "内容")));
    }

    #[tokio::test]
    async fn test_cache_short_circuits_second_call() {
        let dir = TempDir::new().unwrap();
        let provider = ScriptedProvider::replying(POSITIVE);
        let config = AnalyzerConfig {
            cache_dir: Some(dir.path().to_path_buf()),
            ..AnalyzerConfig::uncached()
        };
        let analyzer = SentimentAnalyzer::new(provider.clone(), GenerationOptions::default(), config);

        let first = analyzer.analyze("美联储降息", "利好黄金").await;
        let second = analyzer.analyze(" 美联储降息 ", "利好黄金").await;

        assert_eq!(first, second);
        assert_eq!(first.sentiment, Sentiment::Positive);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let provider = ScriptedProvider::replying(POSITIVE);
        let analyzer = SentimentAnalyzer::new(provider.clone(), GenerationOptions::default(), AnalyzerConfig::uncached());

        let news = vec![
            NewsItem::new("第一条", "https://a", "2024-01-01"),
            NewsItem::new("", "https://b", "2024-01-02"),
            NewsItem::new("第三条", "https://c", "2024-01-03"),
        ];
        let analyzed = analyzer.analyze_batch(news).await;

        let urls: Vec<&str> = analyzed.iter().map(|a| a.news.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
        assert_eq!(analyzed[1].sentiment_analysis.reasoning, "标题和内容都为空");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prompt_truncates_content() {
        let long = "金".repeat(1500);
        let prompt = build_prompt("标题", &long, 1000);
        assert!(prompt.contains(&"金".repeat(1000)));
        assert!(!prompt.contains(&"金".repeat(1001)));
        assert!(prompt.contains("\"sentiment\": \"positive/negative/neutral\""));
    }

    #[test]
    fn test_cache_key_is_sha256_hex() {
        let key = cache_key("a", "b");
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key("a", "b"));
        assert_ne!(key, cache_key("a_", "b"));
    }
}
