use std::borrow::Cow;

/// Errors surfaced by the Kafka wrappers.
#[toolx_derive::toolx_error]
pub enum KafkaError {
    /// Failure reported by the underlying `rdkafka` driver.
    #[error("Kafka error{}: {source}", format_context(.context))]
    Kafka { source: rdkafka::error::KafkaError, context: Option<Cow<'static, str>> },

    /// A client, producer or consumer was configured incorrectly.
    #[error("Invalid Kafka configuration{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal Kafka error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
