//! # Cache
//!
//! A backend-agnostic async cache: the [`Cache`] trait covers string values,
//! expiry management and atomic counters, with JSON helpers layered on top
//! through [`CacheExt`]. Two backends implement it:
//!
//! - [`RedisCache`] over a shared, self-reconnecting connection manager;
//! - [`MemoryCache`] over an in-process `moka` cache with per-entry expiry.
//!
//! ```rust
//! use std::time::Duration;
//! use toolx_cache::{Cache, MemoryCache};
//!
//! # async fn run() -> Result<(), toolx_cache::CacheError> {
//! let cache = MemoryCache::new();
//! cache.set("greeting", "hello", Some(Duration::from_secs(60))).await?;
//! assert!(cache.exists("greeting").await?);
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod redis;

pub use crate::error::{CacheError, CacheErrorExt};
pub use crate::memory::MemoryCache;
pub use crate::redis::{RedisCache, RedisCacheBuilder};

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Backend-agnostic cache operations.
///
/// Values are strings; integers are stored in their decimal form so that
/// [`Cache::incr_by`] can operate on them.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Looks up a value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a value, optionally with a time to live.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Removes a key and reports whether it existed.
    async fn del(&self, key: &str) -> Result<bool, CacheError>;

    /// Reports whether a key exists.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Replaces the time to live of an existing key. Returns `false` when
    /// the key is missing.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Remaining lifetime of a key. `None` when the key is missing or has
    /// no expiry set.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Adds `delta` to the integer stored at `key`, creating it at zero
    /// first. The key's expiry is left untouched.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError>;
}

/// JSON convenience helpers available on every [`Cache`] backend.
#[async_trait]
pub trait CacheExt: Cache {
    /// Deserializes the JSON value stored at `key`.
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serializes `value` as JSON and stores it at `key`.
    async fn set_json<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }
}

#[async_trait]
impl<C: Cache + ?Sized> CacheExt for C {}
