use std::fmt;

use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tracing::debug;

use crate::error::{KafkaError, KafkaErrorExt};

/// Message producer wrapping an `rdkafka` [`FutureProducer`].
///
/// Created via [`KafkaClient::producer`](crate::KafkaClient::producer);
/// messages are delivered with `acks=all` and time out after the configured
/// message timeout.
#[derive(Clone)]
pub struct Producer {
    pub(crate) inner: FutureProducer,
}

impl Producer {
    /// Sends `payload` to `topic` and waits for broker acknowledgement.
    ///
    /// The optional `key` drives partition assignment; without one the
    /// partitioner distributes messages itself. Returns the partition and
    /// offset the message landed on.
    ///
    /// # Errors
    /// [`KafkaError::Kafka`] when delivery fails or the message times out.
    pub async fn send(
        &self,
        topic: &str,
        key: Option<&str>,
        payload: &[u8],
    ) -> Result<(i32, i64), KafkaError> {
        let mut record: FutureRecord<'_, str, [u8]> = FutureRecord::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        match self.inner.send(record, Timeout::Never).await {
            Ok((partition, offset)) => {
                debug!(topic, partition, offset, "Message delivered");
                Ok((partition, offset))
            }
            Err((source, _)) => Err(KafkaError::Kafka {
                source,
                context: Some(format!("Delivering to '{topic}'").into()),
            }),
        }
    }

    /// Waits until every queued message is delivered or failed.
    ///
    /// # Errors
    /// [`KafkaError::Kafka`] when the flush does not finish within `timeout`.
    pub fn flush(&self, timeout: std::time::Duration) -> Result<(), KafkaError> {
        use rdkafka::producer::Producer as _;
        self.inner.flush(timeout).context("Flushing producer queue")
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}
