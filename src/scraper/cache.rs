//! In-memory dataset cache with a freshness window.
//!
//! Holds the last assembled [`Dataset`] for the lifetime of the process. The
//! entry is only ever replaced whole.

use chrono::{DateTime, Duration, Utc};
use std::sync::{PoisonError, RwLock};

use crate::types::Dataset;

/// Default freshness window
pub const DEFAULT_MAX_AGE_HOURS: i64 = 6;

/// Cache entry with timestamp
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Dataset,
    cached_at: DateTime<Utc>,
}

/// Process-wide games cache
#[derive(Debug)]
pub struct GamesCache {
    entry: RwLock<Option<CacheEntry>>,
    max_age: Duration,
}

impl GamesCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            max_age,
        }
    }

    /// The cached dataset if it is younger than the freshness window
    pub fn get_fresh(&self) -> Option<Dataset> {
        let guard = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        let entry = guard.as_ref()?;
        if Utc::now() - entry.cached_at >= self.max_age {
            return None;
        }
        Some(entry.data.clone())
    }

    /// Replace the entry and reset its age
    pub fn store(&self, data: Dataset) {
        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(CacheEntry {
            data,
            cached_at: Utc::now(),
        });
    }

    /// When the current entry was stored
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|entry| entry.cached_at)
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl Default for GamesCache {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_MAX_AGE_HOURS))
    }
}
