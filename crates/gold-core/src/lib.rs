//! # gold-core
//!
//! Provider-agnostic LLM abstraction used by the gold sentiment advisor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SentimentAnalyzer                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Prompt    │  │   Retry     │  │   LlmProvider       │  │
//! │  │  Messages   │──│   Policy    │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the analyzer talk to any OpenAI-compatible
//! endpoint, or a scripted double in tests, without code changes.

pub mod provider;
pub mod message;
pub mod error;
pub mod retry;

pub use error::{CoreError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use retry::{RetryPolicy, Retryable};
