//! Label resolver
//!
//! Serves the set of valid labels from a short-lived cache. Reads inside the
//! freshness window never touch the network; stale or empty reads try one
//! remote refresh and fall back to the last cached value (or the configured
//! defaults) when it fails.

use crate::error::Error;
use crate::platform::RecordService;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// A forced refresh failed; carries the labels that remain in effect
#[derive(Debug, Error)]
#[error("label refresh failed: {source}")]
pub struct RefreshError {
    /// The remote error
    #[source]
    pub source: Error,
    /// Labels still served (previous cache or defaults)
    pub fallback: Vec<String>,
}

#[derive(Debug, Default)]
struct LabelCache {
    labels: Vec<String>,
    fetched_at: Option<Instant>,
}

/// Cached view of the remote label list
pub struct LabelResolver {
    records: Arc<dyn RecordService>,
    cache: RwLock<LabelCache>,
    ttl: Duration,
    defaults: Vec<String>,
}

impl LabelResolver {
    /// Create a resolver with an empty cache
    pub fn new(records: Arc<dyn RecordService>, ttl: Duration, defaults: Vec<String>) -> Self {
        Self {
            records,
            cache: RwLock::new(LabelCache::default()),
            ttl,
            defaults,
        }
    }

    /// Current labels; refresh errors degrade to stale or default data
    pub async fn current_labels(&self) -> Vec<String> {
        if let Some(labels) = self.fresh() {
            return labels;
        }

        match self.refresh().await {
            Ok(labels) => labels,
            Err(e) => {
                tracing::warn!(error = %e, "label refresh failed, serving cached labels");
                self.cached_labels()
            }
        }
    }

    /// Refresh regardless of freshness; the error is returned to the caller
    pub async fn force_refresh(&self) -> Result<Vec<String>, RefreshError> {
        self.refresh().await.map_err(|source| RefreshError {
            source,
            fallback: self.cached_labels(),
        })
    }

    /// Last cached labels without any remote call, or the defaults if never fetched
    pub fn cached_labels(&self) -> Vec<String> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        if cache.labels.is_empty() {
            self.defaults.clone()
        } else {
            cache.labels.clone()
        }
    }

    fn fresh(&self) -> Option<Vec<String>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let fetched_at = cache.fetched_at?;
        (fetched_at.elapsed() < self.ttl && !cache.labels.is_empty()).then(|| cache.labels.clone())
    }

    async fn refresh(&self) -> crate::error::Result<Vec<String>> {
        let remote = self.records.list_labels().await?;
        let mut labels = dedup_labels(remote);
        if labels.is_empty() {
            labels.clone_from(&self.defaults);
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.labels.clone_from(&labels);
        cache.fetched_at = Some(Instant::now());
        tracing::debug!(count = labels.len(), "label cache refreshed");

        Ok(labels)
    }
}

/// Trim, drop blanks and duplicates, keep first-seen order
fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}
