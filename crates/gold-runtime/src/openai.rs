//! OpenAI-compatible LLM Provider
//!
//! Implementation of `LlmProvider` for any service exposing the OpenAI
//! `/chat/completions` and `/models` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use gold_core::{
    error::{CoreError, Result},
    message::Message,
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
        TokenUsage,
    },
    retry::RetryPolicy,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiCompatConfig {
    /// Base URL, e.g. `https://api.openai.com/v1/`
    pub base_url: String,

    /// Bearer token
    pub api_key: String,

    /// Default model name
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Total attempts per completion
    pub max_retries: u32,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/".into(),
            api_key: String::new(),
            model: "hunyuan-lite".into(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl OpenAiCompatConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("API_BASE_URL").unwrap_or(defaults.base_url);
        let api_key = std::env::var("API_KEY").unwrap_or_default();
        let model = std::env::var("MODEL_NAME").unwrap_or(defaults.model);
        let timeout_secs = std::env::var("SENTIMENT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);
        let max_retries = std::env::var("SENTIMENT_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);

        Self {
            base_url,
            api_key,
            model,
            timeout_secs,
            max_retries,
        }
    }

    /// Collect every configuration problem into one error
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.api_key.trim().is_empty() {
            problems.push("API_KEY is not set");
        }
        if self.base_url.trim().is_empty() {
            problems.push("API_BASE_URL is empty");
        }
        if self.model.trim().is_empty() {
            problems.push("MODEL_NAME is empty");
        }
        if self.timeout_secs == 0 {
            problems.push("SENTIMENT_TIMEOUT must be positive");
        }
        if self.max_retries == 0 {
            problems.push("SENTIMENT_MAX_RETRIES must be positive");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Config(problems.join("; ")))
        }
    }

    /// `base_url` joined with `path`, tolerating a missing or doubled slash
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

/// OpenAI-compatible chat-completions provider
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
    retry: RetryPolicy,
}

impl OpenAiCompatProvider {
    /// Create from configuration; fails on an invalid config
    pub fn from_config(config: OpenAiCompatConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("HTTP client: {e}")))?;

        let retry = RetryPolicy {
            max_attempts: config.max_retries,
            ..RetryPolicy::default()
        };

        Ok(Self { client, config, retry })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiCompatConfig::from_env())
    }

    /// Replace the backoff policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }

    fn build_request<'a>(messages: &'a [Message], options: &'a GenerationOptions) -> ChatRequest<'a> {
        ChatRequest {
            model: &options.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
        }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout(self.config.timeout_secs)
        } else {
            CoreError::ProviderUnavailable(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(classify_status(status, body))
    }

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        Self::check_status(response)
            .await?
            .json::<ChatResponse>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))
    }

    fn convert_completion(response: ChatResponse, requested_model: &str) -> Result<Completion> {
        let ChatResponse { model, choices, usage } = response;
        let choice = choices
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Parse("response has no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: model.unwrap_or_else(|| requested_model.to_string()),
            usage: usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_wire),
        })
    }
}

/// Map a non-success HTTP status onto the error taxonomy
fn classify_status(status: StatusCode, body: String) -> CoreError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => CoreError::RateLimited(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CoreError::Auth(body),
        s if s.is_server_error() => CoreError::ProviderUnavailable(format!("HTTP {s}: {body}")),
        s => CoreError::Provider(format!("HTTP {s}: {body}")),
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "OpenAI-compatible".into(),
            endpoint: self.config.base_url.clone(),
            models,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Provider health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options);

        tracing::debug!(
            "Requesting completion (model: {}, messages: {})",
            options.model,
            messages.len()
        );

        let response = self
            .retry
            .run("chat completion", || self.send_chat(&request))
            .await?;

        Self::convert_completion(response, &options.model)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.config.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let list = Self::check_status(response)
            .await?
            .json::<ModelList>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))?;

        Ok(list.data)
    }
}
