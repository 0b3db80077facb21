//! Cache trait and the in-memory TTL store.

use crate::key::CacheKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when an operation has no entry of its own, in milliseconds
    pub default_ttl_ms: u64,
    /// Per-operation TTL overrides, in milliseconds
    pub operation_ttl_ms: BTreeMap<String, u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: 24 * 60 * 60 * 1000, // 24 hours
            operation_ttl_ms: BTreeMap::new(),
        }
    }
}

impl CacheConfig {
    /// Set the default TTL
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Override the TTL of one operation
    #[must_use]
    pub fn with_operation_ttl(mut self, operation: impl Into<String>, ttl: Duration) -> Self {
        self.operation_ttl_ms
            .insert(operation.into(), ttl.as_millis() as u64);
        self
    }

    /// TTL that applies to `operation`
    #[must_use]
    pub fn ttl_for(&self, operation: &str) -> Duration {
        let ms = self
            .operation_ttl_ms
            .get(operation)
            .copied()
            .unwrap_or(self.default_ttl_ms);
        Duration::from_millis(ms)
    }
}

/// Cache error.
///
/// The in-memory store never fails; networked implementations report
/// their failures through this type and callers treat them as misses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Backend could not be reached
    #[error("cache unavailable: {reason}")]
    Unavailable {
        /// Backend message
        reason: String,
    },
    /// Stored bytes could not be decoded
    #[error("corrupt cache entry {key}: {reason}")]
    Corrupt {
        /// Affected key
        key: String,
        /// Decoder message
        reason: String,
    },
}

/// One stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Content address
    pub key: CacheKey,
    /// Stored payload
    pub data: Value,
    /// When the entry was written
    pub inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups that returned an entry
    pub hits: u64,
    /// Lookups that found nothing live
    pub misses: u64,
    /// Entries evicted because their TTL passed
    pub expirations: u64,
    /// Entries currently held
    pub entries: usize,
}

/// Two-method cache contract shared by every backend.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up the live entry for `(operation, request)`
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    async fn get(&self, operation: &str, request: &Value) -> Result<Option<CacheEntry>, CacheError>;

    /// Store `data` under `(operation, request)` with the operation's TTL
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    async fn set(&self, operation: &str, request: &Value, data: Value) -> Result<CacheKey, CacheError>;
}

struct Slot {
    entry: CacheEntry,
    expires_at: Instant,
}

/// In-memory cache: a keyed map behind a mutex.
///
/// An expired entry is evicted when it is looked up, and every write first
/// sweeps all expired entries, so the map only outgrows the live set
/// between writes.
pub struct MemoryCache {
    config: CacheConfig,
    slots: Mutex<HashMap<CacheKey, Slot>>,
    stats: Mutex<CacheStats>,
}

impl MemoryCache {
    /// Create a cache with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create with custom configuration
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Snapshot of the statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.len();
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone();
        stats.entries = entries;
        stats
    }

    /// Entries held, including expired ones not yet evicted
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = match slots.get(key) {
            None => {
                stats.misses += 1;
                return None;
            }
            Some(slot) => now >= slot.expires_at,
        };
        if expired {
            slots.remove(key);
            stats.expirations += 1;
            stats.misses += 1;
            tracing::debug!(%key, "cache entry expired");
            return None;
        }
        stats.hits += 1;
        slots.get(key).map(|slot| slot.entry.clone())
    }

    fn store(&self, key: CacheKey, data: Value, ttl: Duration) {
        let inserted_at = Instant::now();
        let slot = Slot {
            entry: CacheEntry {
                key: key.clone(),
                data,
                inserted_at,
            },
            expires_at: inserted_at + ttl,
        };
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        slots.retain(|_, slot| inserted_at < slot.expires_at);
        let swept = before - slots.len();
        if swept > 0 {
            self.stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .expirations += swept as u64;
            tracing::debug!(swept, "expired cache entries swept");
        }
        slots.insert(key, slot);
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, operation: &str, request: &Value) -> Result<Option<CacheEntry>, CacheError> {
        let key = CacheKey::compute(operation, request);
        Ok(self.lookup(&key))
    }

    async fn set(&self, operation: &str, request: &Value, data: Value) -> Result<CacheKey, CacheError> {
        let key = CacheKey::compute(operation, request);
        let ttl = self.config.ttl_for(operation);
        tracing::debug!(%key, ttl_ms = ttl.as_millis() as u64, "cache write");
        self.store(key.clone(), data, ttl);
        Ok(key)
    }
}
