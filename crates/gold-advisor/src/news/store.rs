//! JSON batch store
//!
//! Batches live in a flat directory as `<prefix>_YYYYmmdd_HHMMSS.json`, so the
//! lexicographically greatest name is the newest batch.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AdvisorError, Result};
use crate::model::SentimentRecord;

/// Crawled news batches
pub const RAW_PREFIX: &str = "gold_news";

/// News batches with sentiment attached
pub const ANALYZED_PREFIX: &str = "sentiment_analysis";

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn batch_file_name(prefix: &str, at: NaiveDateTime) -> String {
    format!("{}_{}.json", prefix, at.format(STAMP_FORMAT))
}

/// Whether `name` is `<prefix>_YYYYmmdd_HHMMSS.json`
fn is_batch_name(name: &str, prefix: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".json"))
    else {
        return false;
    };

    let bytes = stamp.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'_'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit())
}

/// Write a batch stamped with the current local time
pub async fn save_batch<T: Serialize>(dir: &Path, prefix: &str, items: &[T]) -> Result<PathBuf> {
    save_batch_at(dir, prefix, items, Local::now().naive_local()).await
}

pub async fn save_batch_at<T: Serialize>(
    dir: &Path,
    prefix: &str,
    items: &[T],
    at: NaiveDateTime,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(batch_file_name(prefix, at));
    let body = serde_json::to_string_pretty(items)?;
    tokio::fs::write(&path, body).await?;

    tracing::info!("Saved {} items to {}", items.len(), path.display());
    Ok(path)
}

/// Newest batch for `prefix`, or `None` when the directory has none
pub async fn latest_batch(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<String> = None;
    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_batch_name(&name, prefix) && newest.as_ref().is_none_or(|n| name > *n) {
            newest = Some(name);
        }
    }

    Ok(newest.map(|name| dir.join(name)))
}

async fn read_json(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw)
        .map_err(|e| AdvisorError::Parse(format!("{}: {}", path.display(), e)))
}

/// Sentiment records from an analysed batch
///
/// Missing fields take their defaults; a lone object counts as a batch of one.
pub async fn load_records(path: &Path) -> Result<Vec<SentimentRecord>> {
    match read_json(path).await? {
        Value::Array(items) => Ok(items.iter().map(SentimentRecord::from_value).collect()),
        item @ Value::Object(_) => Ok(vec![SentimentRecord::from_value(&item)]),
        other => Err(AdvisorError::Parse(format!(
            "{}: expected an array of records, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Strictly typed batch
pub async fn load_batch<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match read_json(path).await? {
        item @ Value::Object(_) => Ok(vec![serde_json::from_value(item)?]),
        value => Ok(serde_json::from_value(value)?),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
