//! TTL file cache
//!
//! One pretty-printed JSON file per entry at `dir/<namespace>_<key>.json`.
//! An entry is fresh while its modification time is within `ttl`. No
//! locking: the last writer wins.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{de::DeserializeOwned, Serialize};

const SECS_PER_DAY: u64 = 86_400;

#[derive(Clone, Debug)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    /// Cache with a TTL in whole days. Huge values saturate.
    pub fn with_days(dir: impl Into<PathBuf>, days: u64) -> Self {
        Self::new(dir, Duration::from_secs(days.saturating_mul(SECS_PER_DAY)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &str, key: &str) -> PathBuf {
        self.dir.join(format!("{namespace}_{key}.json"))
    }

    async fn is_fresh(&self, path: &Path) -> bool {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age < self.ttl
    }

    /// Fresh entry, or `None` when missing, expired or unreadable
    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        let path = self.path_for(namespace, key);
        if !self.is_fresh(&path).await {
            return None;
        }

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store an entry. Failures are logged, never raised.
    pub async fn put<T: Serialize>(&self, namespace: &str, key: &str, value: &T) {
        let path = self.path_for(namespace, key);

        let body = match serde_json::to_string_pretty(value) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!("Failed to create cache dir {}: {}", self.dir.display(), e);
            return;
        }

        if let Err(e) = tokio::fs::write(&path, body).await {
            tracing::warn!("Failed to write cache entry {}: {}", path.display(), e);
        }
    }
}
