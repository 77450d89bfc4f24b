use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;

use crate::error::CacheError;
use crate::Cache;

/// Max bound on cached entries to keep memory use predictable.
const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    deadline: Option<Instant>,
}

struct DeadlineExpiry;

impl Expiry<String, Entry> for DeadlineExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        created_at: Instant,
    ) -> Option<Duration> {
        entry.deadline.map(|deadline| deadline.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        entry.deadline.map(|deadline| deadline.saturating_duration_since(updated_at))
    }
}

/// In-process cache backend with per-entry expiry.
///
/// Entries without a time to live stay until capacity eviction. Expiry is
/// tracked through absolute deadlines, so `ttl` reports the remaining
/// lifetime exactly as a server-side backend would.
pub struct MemoryCache {
    entries: MokaCache<String, Entry>,
    // Serializes read-modify-write increments.
    write_lock: Mutex<()>,
}

impl MemoryCache {
    /// Creates a cache bounded to 10 000 entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache bounded to `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        let entries =
            MokaCache::builder().max_capacity(capacity).expire_after(DeadlineExpiry).build();
        Self { entries, write_lock: Mutex::new(()) }
    }

    /// Returns the entry at `key` unless its deadline has passed.
    async fn live(&self, key: &str) -> Option<Entry> {
        let entry = self.entries.get(key).await?;
        match entry.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                self.entries.invalidate(key).await;
                None
            }
            _ => Some(entry),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.live(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let deadline = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries.insert(key.to_owned(), Entry { value: value.to_owned(), deadline }).await;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        let existed = self.live(key).await.is_some();
        self.entries.invalidate(key).await;
        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live(key).await.is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        match self.live(key).await {
            Some(entry) => {
                let deadline = Instant::now().checked_add(ttl);
                self.entries.insert(key.to_owned(), Entry { value: entry.value, deadline }).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let now = Instant::now();
        Ok(self
            .live(key)
            .await
            .and_then(|entry| entry.deadline.map(|deadline| deadline.saturating_duration_since(now))))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let _guard = self.write_lock.lock().await;
        let (current, deadline) = match self.live(key).await {
            Some(entry) => {
                let parsed = entry.value.parse::<i64>().map_err(|_| CacheError::Internal {
                    message: format!("Value at '{key}' is not an integer").into(),
                    context: None,
                })?;
                (parsed, entry.deadline)
            }
            None => (0, None),
        };
        let next = current.checked_add(delta).ok_or_else(|| CacheError::Internal {
            message: format!("Increment overflows the value at '{key}'").into(),
            context: None,
        })?;
        self.entries.insert(key.to_owned(), Entry { value: next.to_string(), deadline }).await;
        Ok(next)
    }
}
