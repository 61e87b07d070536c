//! Source cache
//!
//! In-memory memoization of raw fetch results keyed by [`RequestKey`].
//! Entries are immutable and never evicted: catalog pages are treated as
//! fixed for the lifetime of the process.
//!
//! There is no single-flight guarantee. Two callers missing on the same key
//! at the same time both fetch and both store; the last write wins. Callers
//! that need one fetch per key must serialize above this layer.

mod key;

pub use key::{RequestKey, RequestKind};

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A raw result owned by the cache
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// A pruned HTML document or fragment
    Html(Arc<str>),

    /// One raw JSON response body
    Json(Arc<Value>),
}

impl CacheEntry {
    pub fn as_html(&self) -> Option<&Arc<str>> {
        match self {
            Self::Html(html) => Some(html),
            Self::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Arc<Value>> {
        match self {
            Self::Json(json) => Some(json),
            Self::Html(_) => None,
        }
    }

    /// Returns true if both entries share the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Html(a), Self::Html(b)) => Arc::ptr_eq(a, b),
            (Self::Json(a), Self::Json(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-lifetime memoization store
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: Mutex<HashMap<RequestKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for a key, if any
    pub fn lookup(&self, key: &RequestKey) -> Option<CacheEntry> {
        let found = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        match &found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }

        found
    }

    /// Stores a result and returns the stored entry
    ///
    /// An existing entry for the same key is replaced.
    pub fn store(&self, key: RequestKey, entry: CacheEntry) -> CacheEntry {
        tracing::trace!(key = %key, "Cache store");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry.clone());
        entry
    }

    /// Checks for an entry without touching the hit/miss counters
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of distinct requests stored
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the hit/miss counters and the entry count
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
