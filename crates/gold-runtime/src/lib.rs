//! # gold-runtime
//!
//! Runtime providers for the gold sentiment advisor.
//!
//! ## Providers
//!
//! - **OpenAI-compatible** (default): any `/chat/completions` endpoint
//!   (OpenAI, hunyuan gateways, vLLM, LM Studio...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gold_runtime::OpenAiCompatProvider;
//!
//! let provider = OpenAiCompatProvider::from_env()?;
//! let analyzer = SentimentAnalyzer::new(Arc::new(provider), options, config);
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiCompatConfig, OpenAiCompatProvider};

// Re-export core types for convenience
pub use gold_core::{
    CoreError, GenerationOptions, LlmProvider, Message, Result, RetryPolicy, Role,
};
