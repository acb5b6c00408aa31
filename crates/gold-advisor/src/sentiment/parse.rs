//! Model reply parsing
//!
//! Replies are expected to be a bare JSON object but often arrive wrapped in
//! prose or a fenced code block.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{AdvisorError, Result};
use crate::model::{clamp_or_zero, lenient_number, Sentiment, SentimentAnalysis};

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced json pattern compiles")
});

const REQUIRED_FIELDS: [&str; 5] = ["sentiment", "score", "confidence", "keywords", "reasoning"];

/// Confidence attached to replies that could not be parsed
pub const PARSE_FAILURE_CONFIDENCE: f64 = 0.1;

/// Locate the JSON object in a reply: the whole text, then a fenced
/// block, then the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(block) = FENCED_JSON.captures(text).and_then(|caps| caps.get(1)) {
        return Some(block.as_str());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn try_parse(text: &str) -> Result<SentimentAnalysis> {
    let json = extract_json(text)
        .ok_or_else(|| AdvisorError::Parse("无法找到有效的JSON格式".into()))?;
    let value: Value = serde_json::from_str(json)?;
    let object: &Map<String, Value> = value
        .as_object()
        .ok_or_else(|| AdvisorError::Parse("响应不是JSON对象".into()))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(AdvisorError::Parse(format!("缺少必要字段: {missing}")));
    }

    let score = lenient_number(object.get("score"))
        .ok_or_else(|| AdvisorError::Parse("score 不是数值".into()))?;
    let confidence = lenient_number(object.get("confidence"))
        .ok_or_else(|| AdvisorError::Parse("confidence 不是数值".into()))?;

    let sentiment = match object.get("sentiment") {
        Some(Value::String(s)) => Sentiment::parse_lenient(s),
        _ => Sentiment::Neutral,
    };
    let keywords = object
        .get("keywords")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|k| k.as_str().map_or_else(|| k.to_string(), str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let reasoning = match object.get("reasoning") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    Ok(SentimentAnalysis {
        sentiment,
        score: clamp_or_zero(score, -1.0, 1.0),
        confidence: clamp_or_zero(confidence, 0.0, 1.0),
        keywords,
        reasoning,
        analyzed_at: None,
        cache_key: None,
    })
}

/// Parse a model reply. Never fails: unusable replies become a neutral
/// verdict whose reasoning names the problem.
pub fn parse_sentiment_response(text: &str) -> SentimentAnalysis {
    match try_parse(text) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!("Failed to parse sentiment reply: {}", e);
            SentimentAnalysis::neutral(PARSE_FAILURE_CONFIDENCE, format!("解析失败: {e}"))
        }
    }
}
