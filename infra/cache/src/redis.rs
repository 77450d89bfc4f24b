use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tracing::{debug, info};

use crate::error::{CacheError, CacheErrorExt};
use crate::Cache;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 6379;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Redis cache backend over a shared multiplexed connection.
///
/// Cloning is cheap; clones share the same connection manager, which
/// transparently reconnects after connection loss.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Returns a builder with localhost defaults.
    #[must_use]
    pub fn builder() -> RedisCacheBuilder {
        RedisCacheBuilder::default()
    }

    /// Hands out a connection manager clone for raw commands.
    #[must_use]
    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

/// Builder for [`RedisCache`].
///
/// Either a full connection `url` or the individual host/port/db/password
/// parts can be supplied; the parts are assembled into a `redis://` URL.
#[must_use = "The builder must be finished with `connect` to create a cache."]
pub struct RedisCacheBuilder {
    url: Option<String>,
    host: String,
    port: u16,
    db: i64,
    password: Option<String>,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl Default for RedisCacheBuilder {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            db: 0,
            password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl RedisCacheBuilder {
    /// Full connection URL; takes precedence over the individual parts.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Server host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Server port.
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Logical database index.
    pub const fn db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Server password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Timeout for establishing a connection.
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Timeout for a single command round trip.
    pub const fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Connects to the server, issuing a `PING` so that an unreachable
    /// server fails construction instead of the first command.
    ///
    /// # Errors
    /// [`CacheError::Redis`] when the URL is invalid, the connection cannot
    /// be established within the timeout, or the probe fails.
    pub async fn connect(self) -> Result<RedisCache, CacheError> {
        let url = match &self.url {
            Some(url) => url.clone(),
            None => self.assemble_url(),
        };

        let client = redis::Client::open(url.as_str()).context("Invalid Redis URL")?;
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(self.connect_timeout)
            .set_response_timeout(self.response_timeout);
        let mut manager = ConnectionManager::new_with_config(client, config)
            .await
            .context("Connecting to Redis failed")?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .context("Redis connection probe failed")?;
        debug!(%pong, "Redis answered the connection probe");
        info!("Redis connection established");

        Ok(RedisCache { manager })
    }

    fn assemble_url(&self) -> String {
        match &self.password {
            Some(password) => {
                format!("redis://:{password}@{}:{}/{}", self.host, self.port, self.db)
            }
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl fmt::Debug for RedisCacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheBuilder")
            .field("url", &self.url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("connect_timeout", &self.connect_timeout)
            .field("response_timeout", &self.response_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.manager.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut connection = self.manager.clone();
        match ttl {
            Some(ttl) => {
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
                let _: () = connection.pset_ex(key, value, millis).await?;
            }
            None => {
                let _: () = connection.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        let mut connection = self.manager.clone();
        let removed: i64 = connection.del(key).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut connection = self.manager.clone();
        let found: bool = connection.exists(key).await?;
        Ok(found)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut connection = self.manager.clone();
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let updated: bool = connection.pexpire(key, millis).await?;
        Ok(updated)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let mut connection = self.manager.clone();
        let millis: i64 = connection.pttl(key).await?;
        Ok((millis >= 0).then(|| Duration::from_millis(millis.cast_unsigned())))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let mut connection = self.manager.clone();
        let value: i64 = connection.incr(key, delta).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_assemble_into_a_url() {
        let builder = RedisCache::builder().host("cache.internal").port(6380).db(2);
        assert_eq!(builder.assemble_url(), "redis://cache.internal:6380/2");

        let with_password = RedisCache::builder().password("hunter2");
        assert_eq!(with_password.assemble_url(), "redis://:hunter2@127.0.0.1:6379/0");
    }

    #[test]
    fn builder_defaults_match_the_documented_timeouts() {
        let builder = RedisCache::builder();
        assert_eq!(builder.connect_timeout, Duration::from_secs(5));
        assert_eq!(builder.response_timeout, Duration::from_secs(3));
        assert_eq!(builder.port, 6379);
        assert_eq!(builder.db, 0);
    }

    #[test]
    fn debug_output_does_not_leak_the_password() {
        let builder = RedisCache::builder().password("hunter2");
        let rendered = format!("{builder:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
