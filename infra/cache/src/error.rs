use std::borrow::Cow;

/// Errors surfaced by the cache backends.
#[toolx_derive::toolx_error]
pub enum CacheError {
    /// A Redis command or connection failure.
    #[error("Redis error{}: {source}", format_context(.context))]
    Redis { source: redis::RedisError, context: Option<Cow<'static, str>> },

    /// JSON (de)serialization failure in the `get_json`/`set_json` helpers.
    #[error("Cache serialization error{}: {source}", format_context(.context))]
    Serde { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal cache error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
