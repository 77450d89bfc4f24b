use std::fmt;

use rdkafka::consumer::{CommitMode, Consumer as _, StreamConsumer};
use rdkafka::message::{Message as _, OwnedMessage};
use tracing::trace;

use crate::error::{KafkaError, KafkaErrorExt};

/// Message consumer wrapping an `rdkafka` [`StreamConsumer`].
///
/// Created via [`KafkaClient::consumer`](crate::KafkaClient::consumer),
/// already subscribed to its topics. Offsets auto-commit every second;
/// [`Consumer::commit`] checkpoints earlier when needed.
pub struct Consumer {
    pub(crate) inner: StreamConsumer,
}

impl Consumer {
    /// Waits for the next message and detaches it from the consumer buffer.
    ///
    /// # Errors
    /// [`KafkaError::Kafka`] on broker or deserialization failures reported
    /// by the driver.
    pub async fn recv(&self) -> Result<OwnedMessage, KafkaError> {
        let message = self.inner.recv().await.context("Receiving message")?;
        trace!(
            topic = message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "Message received"
        );
        Ok(message.detach())
    }

    /// Commits the current consumer position without waiting for the broker.
    ///
    /// # Errors
    /// [`KafkaError::Kafka`] when the commit cannot be queued.
    pub fn commit(&self) -> Result<(), KafkaError> {
        self.inner.commit_consumer_state(CommitMode::Async).context("Committing offsets")
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").finish_non_exhaustive()
    }
}
