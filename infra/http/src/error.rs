use std::borrow::Cow;

use reqwest::StatusCode;

/// Errors produced by the HTTP client.
#[toolx_derive::toolx_error]
pub enum HttpError {
    /// Connection, TLS, timeout or protocol failure reported by the transport.
    #[error("Transport error{}: {source}", format_context(.context))]
    Transport { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The server answered with a status outside the configured success range.
    #[error("Unexpected status {status} from {url}{}: {body}", format_context(.context))]
    Status { url: String, status: StatusCode, body: String, context: Option<Cow<'static, str>> },

    /// Response body could not be decoded as the expected JSON type.
    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Internal failures: oversized bodies, unexpected content types.
    #[error("HTTP client error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
