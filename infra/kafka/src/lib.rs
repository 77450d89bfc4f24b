//! # Kafka Infrastructure
//!
//! This crate wraps [`rdkafka`] behind a small builder-driven surface: one
//! [`KafkaClient`] carries the broker list, authentication and TLS settings,
//! and hands out ready-to-use [`Producer`]s and [`Consumer`]s that share that
//! configuration.
//!
//! ## Key Features
//! - **Fail-Fast Connectivity**: `connect()` fetches cluster metadata with the
//!   socket timeout, so a wrong broker list fails at startup instead of on the
//!   first send.
//! - **SASL/TLS Presets**: the security protocol (`PLAINTEXT`, `SSL`,
//!   `SASL_PLAINTEXT`, `SASL_SSL`) is derived from which credentials and
//!   certificate paths are set.
//! - **Opinionated Defaults**: `acks=all` producers, `earliest` offset reset
//!   and 1s auto-commit consumers, 10 MB partition fetches.
//!
//! ## Example
//!
//! ```rust,no_run
//! use toolx_kafka::{KafkaClient, KafkaError, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), KafkaError> {
//!     let client = KafkaClient::builder()
//!         .brokers(["localhost:9092"])
//!         .credentials("svc-tool", "secret")
//!         .connect()
//!         .await?;
//!
//!     let producer = client.producer()?;
//!     let (partition, offset) = producer.send("events", Some("k1"), b"hello").await?;
//!     println!("delivered to {partition}@{offset}");
//!
//!     let consumer = client.consumer("tool-workers", ["events"])?;
//!     let message = consumer.recv().await?;
//!     println!("got {:?}", message.payload());
//!
//!     Ok(())
//! }
//! ```

mod consumer;
mod error;
mod producer;

use std::fmt;
use std::time::Duration;

pub use consumer::Consumer;
pub use error::{KafkaError, KafkaErrorExt};
pub use producer::Producer;
use rdkafka::ClientConfig;
use rdkafka::consumer::{Consumer as _, StreamConsumer};
use rdkafka::producer::{FutureProducer, Producer as _};
pub use rdkafka::message::{Message, OwnedMessage};
use tracing::info;

/// Default socket/metadata timeout.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(10);
/// Default delivery timeout for produced messages.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default interval between automatic offset commits.
pub const DEFAULT_COMMIT_INTERVAL: Duration = Duration::from_secs(1);
/// Default upper bound on a single partition fetch.
pub const DEFAULT_MAX_PARTITION_FETCH_BYTES: u32 = 10 * 1024 * 1024;

/// SASL mechanism used when credentials are configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaslMechanism {
    /// `SCRAM-SHA-512`.
    #[default]
    ScramSha512,
    /// `SCRAM-SHA-256`.
    ScramSha256,
    /// `PLAIN`.
    Plain,
}

impl SaslMechanism {
    /// The mechanism name as Kafka expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScramSha512 => "SCRAM-SHA-512",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::Plain => "PLAIN",
        }
    }
}

/// Shared broker configuration from which producers and consumers are built.
#[derive(Clone)]
pub struct KafkaClient {
    brokers: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    mechanism: SaslMechanism,
    ca_path: Option<String>,
    cert_path: Option<String>,
    key_path: Option<String>,
    socket_timeout: Duration,
}

impl KafkaClient {
    /// Creates a new [`KafkaClientBuilder`].
    pub fn builder() -> KafkaClientBuilder {
        KafkaClientBuilder::new()
    }

    /// Creates a producer with `acks=all` and the default message timeout.
    ///
    /// # Errors
    /// [`KafkaError::Kafka`] when the driver rejects the configuration.
    pub fn producer(&self) -> Result<Producer, KafkaError> {
        let inner: FutureProducer =
            self.producer_config().create().context("Creating producer")?;
        Ok(Producer { inner })
    }

    /// Creates a consumer in `group` subscribed to `topics`.
    ///
    /// Consumption starts at the earliest available offset for new groups and
    /// offsets auto-commit every second.
    ///
    /// # Errors
    /// [`KafkaError::Configuration`] for an empty group id or topic list,
    /// [`KafkaError::Kafka`] when creation or subscription fails.
    pub fn consumer<I, S>(&self, group: &str, topics: I) -> Result<Consumer, KafkaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if group.is_empty() {
            return Err(KafkaError::Configuration {
                message: "Consumer group id is required".into(),
                context: None,
            });
        }
        let topics: Vec<String> = topics.into_iter().map(Into::into).collect();
        if topics.is_empty() {
            return Err(KafkaError::Configuration {
                message: "At least one topic is required".into(),
                context: None,
            });
        }

        let inner: StreamConsumer =
            self.consumer_config(group).create().context("Creating consumer")?;
        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        inner.subscribe(&topic_refs).context("Subscribing to topics")?;
        info!(group, ?topics, "Kafka consumer subscribed");

        Ok(Consumer { inner })
    }

    async fn probe(&self) -> Result<(), KafkaError> {
        let probe: FutureProducer =
            self.base_config().create().context("Creating metadata probe")?;
        let timeout = self.socket_timeout;
        let metadata = tokio::task::spawn_blocking(move || {
            probe.client().fetch_metadata(None, timeout)
        })
        .await
        .map_err(|e| KafkaError::Internal {
            message: format!("Metadata probe task failed: {e}").into(),
            context: None,
        })?
        .context("Fetching cluster metadata")?;

        info!(
            brokers = metadata.brokers().len(),
            topics = metadata.topics().len(),
            "Kafka connection established"
        );
        Ok(())
    }

    fn base_config(&self) -> ClientConfig {
        let sasl = self.username.is_some();
        let tls = self.ca_path.is_some() || self.cert_path.is_some();

        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.brokers.join(","))
            .set("socket.timeout.ms", self.socket_timeout.as_millis().to_string())
            .set("security.protocol", security_protocol(sasl, tls));

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config
                .set("sasl.mechanisms", self.mechanism.as_str())
                .set("sasl.username", username.as_str())
                .set("sasl.password", password.as_str());
        }
        if let Some(ca) = &self.ca_path {
            config.set("ssl.ca.location", ca.as_str());
        }
        if let Some(cert) = &self.cert_path {
            config.set("ssl.certificate.location", cert.as_str());
        }
        if let Some(key) = &self.key_path {
            config.set("ssl.key.location", key.as_str());
        }
        config
    }

    fn producer_config(&self) -> ClientConfig {
        let mut config = self.base_config();
        config
            .set("acks", "all")
            .set("message.timeout.ms", DEFAULT_MESSAGE_TIMEOUT.as_millis().to_string());
        config
    }

    fn consumer_config(&self, group: &str) -> ClientConfig {
        let mut config = self.base_config();
        config
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", DEFAULT_COMMIT_INTERVAL.as_millis().to_string())
            .set("max.partition.fetch.bytes", DEFAULT_MAX_PARTITION_FETCH_BYTES.to_string());
        config
    }
}

impl fmt::Debug for KafkaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaClient")
            .field("brokers", &self.brokers)
            .field("username", &self.username)
            .field("mechanism", &self.mechanism)
            .field("socket_timeout", &self.socket_timeout)
            .finish_non_exhaustive()
    }
}

/// A fluent builder for configuring a [`KafkaClient`].
#[must_use = "builders do nothing unless you call .connect()"]
#[derive(Default)]
pub struct KafkaClientBuilder {
    brokers: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    mechanism: SaslMechanism,
    ca_path: Option<String>,
    cert_path: Option<String>,
    key_path: Option<String>,
    socket_timeout: Option<Duration>,
}

impl KafkaClientBuilder {
    /// Creates a new [`KafkaClientBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bootstrap brokers (`host:port`). At least one is required.
    pub fn brokers<I, S>(mut self, brokers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brokers.extend(brokers.into_iter().map(Into::into));
        self
    }

    /// Enables SASL authentication with the configured mechanism.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Selects the SASL mechanism. Defaults to `SCRAM-SHA-512`.
    pub const fn mechanism(mut self, mechanism: SaslMechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// CA certificate path for broker verification; enables TLS.
    pub fn tls_ca(mut self, path: impl Into<String>) -> Self {
        self.ca_path = Some(path.into());
        self
    }

    /// Client certificate and key paths for mutual TLS; enables TLS.
    pub fn tls_identity(mut self, cert: impl Into<String>, key: impl Into<String>) -> Self {
        self.cert_path = Some(cert.into());
        self.key_path = Some(key.into());
        self
    }

    /// Socket and metadata timeout. Defaults to 10s.
    pub const fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// Consumes the builder, verifies connectivity and returns the client.
    ///
    /// The check fetches cluster metadata with the socket timeout, so an
    /// unreachable or misconfigured cluster fails here rather than on first
    /// use.
    ///
    /// # Errors
    /// [`KafkaError::Configuration`] for missing brokers or empty
    /// credentials, [`KafkaError::Kafka`] when the metadata fetch fails.
    pub async fn connect(self) -> Result<KafkaClient, KafkaError> {
        let client = self.assemble()?;
        client.probe().await?;
        Ok(client)
    }

    fn assemble(self) -> Result<KafkaClient, KafkaError> {
        if self.brokers.is_empty() {
            return Err(KafkaError::Configuration {
                message: "At least one broker is required".into(),
                context: None,
            });
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            if username.is_empty() || password.is_empty() {
                return Err(KafkaError::Configuration {
                    message: "Credentials must not be empty".into(),
                    context: None,
                });
            }
        }

        Ok(KafkaClient {
            brokers: self.brokers,
            username: self.username,
            password: self.password,
            mechanism: self.mechanism,
            ca_path: self.ca_path,
            cert_path: self.cert_path,
            key_path: self.key_path,
            socket_timeout: self.socket_timeout.unwrap_or(DEFAULT_SOCKET_TIMEOUT),
        })
    }
}

impl fmt::Debug for KafkaClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaClientBuilder")
            .field("brokers", &self.brokers)
            .field("username", &self.username)
            .field("mechanism", &self.mechanism)
            .finish_non_exhaustive()
    }
}

const fn security_protocol(sasl: bool, tls: bool) -> &'static str {
    match (sasl, tls) {
        (true, true) => "SASL_SSL",
        (true, false) => "SASL_PLAINTEXT",
        (false, true) => "SSL",
        (false, false) => "PLAINTEXT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localhost() -> KafkaClientBuilder {
        KafkaClient::builder().brokers(["localhost:9092"])
    }

    #[test]
    fn building_without_brokers_fails() {
        let err = KafkaClient::builder().assemble().unwrap_err();
        assert!(matches!(err, KafkaError::Configuration { .. }));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let err = localhost().credentials("svc", "").assemble().unwrap_err();
        assert!(matches!(err, KafkaError::Configuration { .. }));
    }

    #[test]
    fn security_protocol_follows_sasl_and_tls() {
        let plain = localhost().assemble().unwrap();
        assert_eq!(plain.base_config().get("security.protocol"), Some("PLAINTEXT"));

        let sasl = localhost().credentials("svc", "secret").assemble().unwrap();
        let config = sasl.base_config();
        assert_eq!(config.get("security.protocol"), Some("SASL_PLAINTEXT"));
        assert_eq!(config.get("sasl.mechanisms"), Some("SCRAM-SHA-512"));
        assert_eq!(config.get("sasl.username"), Some("svc"));

        let ssl = localhost().tls_ca("/etc/ca.pem").assemble().unwrap();
        assert_eq!(ssl.base_config().get("security.protocol"), Some("SSL"));

        let both = localhost().credentials("svc", "secret").tls_ca("/etc/ca.pem").assemble().unwrap();
        assert_eq!(both.base_config().get("security.protocol"), Some("SASL_SSL"));
    }

    #[test]
    fn mechanism_names_match_kafka() {
        assert_eq!(SaslMechanism::ScramSha512.as_str(), "SCRAM-SHA-512");
        assert_eq!(SaslMechanism::ScramSha256.as_str(), "SCRAM-SHA-256");
        assert_eq!(SaslMechanism::Plain.as_str(), "PLAIN");

        let client = localhost()
            .credentials("svc", "secret")
            .mechanism(SaslMechanism::ScramSha256)
            .assemble()
            .unwrap();
        assert_eq!(client.base_config().get("sasl.mechanisms"), Some("SCRAM-SHA-256"));
    }

    #[test]
    fn tls_paths_land_in_the_config() {
        let client = localhost()
            .tls_ca("/etc/kafka/ca.pem")
            .tls_identity("/etc/kafka/client.pem", "/etc/kafka/client.key")
            .assemble()
            .unwrap();

        let config = client.base_config();
        assert_eq!(config.get("ssl.ca.location"), Some("/etc/kafka/ca.pem"));
        assert_eq!(config.get("ssl.certificate.location"), Some("/etc/kafka/client.pem"));
        assert_eq!(config.get("ssl.key.location"), Some("/etc/kafka/client.key"));
    }

    #[test]
    fn timeouts_and_fetch_limits_use_the_defaults() {
        let client = localhost().assemble().unwrap();
        assert_eq!(client.base_config().get("socket.timeout.ms"), Some("10000"));
        assert_eq!(client.producer_config().get("message.timeout.ms"), Some("10000"));
        assert_eq!(client.producer_config().get("acks"), Some("all"));

        let consumer = client.consumer_config("workers");
        assert_eq!(consumer.get("group.id"), Some("workers"));
        assert_eq!(consumer.get("auto.offset.reset"), Some("earliest"));
        assert_eq!(consumer.get("enable.auto.commit"), Some("true"));
        assert_eq!(consumer.get("auto.commit.interval.ms"), Some("1000"));
        assert_eq!(consumer.get("max.partition.fetch.bytes"), Some("10485760"));
    }

    #[test]
    fn explicit_socket_timeout_overrides_the_default() {
        let client = localhost().socket_timeout(Duration::from_secs(3)).assemble().unwrap();
        assert_eq!(client.base_config().get("socket.timeout.ms"), Some("3000"));
    }

    #[test]
    fn consumers_need_a_group_and_topics() {
        let client = localhost().assemble().unwrap();

        let err = client.consumer("", ["events"]).unwrap_err();
        assert!(matches!(err, KafkaError::Configuration { .. }));

        let err = client.consumer("workers", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, KafkaError::Configuration { .. }));
    }
}
