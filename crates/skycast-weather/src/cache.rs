//! In-memory TTL cache for upstream responses.
//!
//! Entries expire lazily: staleness is only checked on `get`, which removes
//! the expired entry. There is no size bound and no background sweep.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::key::CacheKey;

/// Time source for entry ages
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to (for tests).
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    inserted_at: Instant,
    value: V,
}

/// Response cache keyed by [`CacheKey`].
///
/// A TTL of zero or less disables caching: `get` always misses and `set`
/// stores nothing. The lock is held only for the map operation itself, so
/// concurrent misses on one key each go upstream and the last `set` wins.
pub struct ResponseCache<V = Arc<serde_json::Value>> {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache using the system clock
    pub fn new(ttl_seconds: i64) -> Self {
        Self::with_clock(ttl_seconds, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        let ttl = u64::try_from(ttl_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Configured TTL, `None` when caching is disabled
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Return the cached value if it is still fresh, evicting it otherwise.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let ttl = self.ttl?;
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) <= ttl {
            tracing::debug!(%key, "Cache hit");
            return Some(entry.value.clone());
        }

        tracing::debug!(%key, "Cache entry expired");
        entries.remove(key);
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set(&self, key: CacheKey, value: V) {
        if self.ttl.is_none() {
            return;
        }

        let entry = CacheEntry {
            inserted_at: self.clock.now(),
            value,
        };
        self.entries.lock().insert(key, entry);
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<V> fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}
