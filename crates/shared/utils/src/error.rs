use std::borrow::Cow;

/// Errors produced by the helper modules.
#[toolx_derive::toolx_error]
pub enum UtilsError {
    /// JSON serialization or deserialization failure.
    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Filesystem access failure.
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Base64 payload could not be decoded.
    #[error("Base64 decode error{}: {source}", format_context(.context))]
    Base64 { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// Internal fallback for parse and logic errors.
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
