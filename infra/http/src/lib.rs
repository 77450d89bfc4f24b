//! # HTTP client
//!
//! A thin wrapper over `reqwest` that adds sequential retries with
//! exponential backoff, a configurable success status range and eager body
//! buffering.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use toolx_http::HttpClient;
//! # async fn run() -> Result<(), toolx_http::HttpError> {
//! let client = HttpClient::builder()
//!     .base_url("https://api.example.com")
//!     .retry_on_5xx()
//!     .build()?;
//!
//! let ticket: serde_json::Value =
//!     client.get("/tickets/42").send().await?.json()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod request;
mod response;

pub use crate::error::{HttpError, HttpErrorExt};
pub use crate::request::RequestBuilder;
pub use crate::response::Response;
pub use reqwest::{Method, StatusCode};

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_COUNT: u32 = 3;
const DEFAULT_RETRY_WAIT: Duration = Duration::from_millis(100);
const DEFAULT_MAX_RETRY_WAIT: Duration = Duration::from_secs(2);
const DEFAULT_SUCCESS_RANGE: RangeInclusive<u16> = 200..=299;
const DEFAULT_MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Decides whether a failed attempt is retried.
///
/// Receives the response status (`None` for transport errors) and the
/// response body or error text.
pub type RetryPredicate = Arc<dyn Fn(Option<StatusCode>, &str) -> bool + Send + Sync>;

/// A cloneable HTTP client with retry and backoff defaults.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Option<String>,
    pub(crate) retry_count: u32,
    pub(crate) retry_wait: Duration,
    pub(crate) max_retry_wait: Duration,
    pub(crate) success_range: RangeInclusive<u16>,
    pub(crate) max_response_size: usize,
    pub(crate) retry_predicate: RetryPredicate,
}

impl HttpClient {
    /// Returns a builder preloaded with the defaults: 30 s timeout, 3
    /// retries, 100 ms base wait capped at 2 s, success range `200..=299`,
    /// retry-everything predicate.
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Starts a request with an arbitrary method.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, self.resolve_url(path))
    }

    /// Starts a `GET` request.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Starts a `POST` request.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Starts a `HEAD` request.
    pub fn head(&self, path: &str) -> RequestBuilder {
        self.request(Method::HEAD, path)
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        self.inner.base_url.as_ref().map_or_else(
            || path.to_owned(),
            |base| format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')),
        )
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("retry_count", &self.inner.retry_count)
            .field("retry_wait", &self.inner.retry_wait)
            .field("max_retry_wait", &self.inner.max_retry_wait)
            .field("success_range", &self.inner.success_range)
            .field("max_response_size", &self.inner.max_response_size)
            .finish_non_exhaustive()
    }
}

/// Builder for [`HttpClient`].
#[must_use = "The builder must be finished with `build` to create a client."]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry_count: u32,
    retry_wait: Duration,
    max_retry_wait: Duration,
    success_range: RangeInclusive<u16>,
    default_headers: Vec<(String, String)>,
    base_url: Option<String>,
    danger_accept_invalid_certs: bool,
    max_response_size: usize,
    retry_predicate: RetryPredicate,
}

impl fmt::Debug for HttpClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientBuilder")
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .field("retry_wait", &self.retry_wait)
            .field("max_retry_wait", &self.max_retry_wait)
            .field("success_range", &self.success_range)
            .field("base_url", &self.base_url)
            .field("max_response_size", &self.max_response_size)
            .finish_non_exhaustive()
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_wait: DEFAULT_RETRY_WAIT,
            max_retry_wait: DEFAULT_MAX_RETRY_WAIT,
            success_range: DEFAULT_SUCCESS_RANGE,
            default_headers: Vec::new(),
            base_url: None,
            danger_accept_invalid_certs: false,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            retry_predicate: Arc::new(|_, _| true),
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout applied to every request.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum retries after the first attempt.
    pub const fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Base delay before the first retry; doubles on every further retry.
    pub const fn retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    /// Ceiling for the backoff delay.
    pub const fn max_retry_wait(mut self, wait: Duration) -> Self {
        self.max_retry_wait = wait;
        self
    }

    /// Status codes that count as success.
    pub const fn success_range(mut self, range: RangeInclusive<u16>) -> Self {
        self.success_range = range;
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Base URL prepended to relative request paths.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Disables certificate verification. Only for test environments.
    pub const fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Largest body `Response::json` will deserialize.
    pub const fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// Custom retry decision over `(status, body-or-error-text)`.
    pub fn retry_predicate(
        mut self,
        predicate: impl Fn(Option<StatusCode>, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.retry_predicate = Arc::new(predicate);
        self
    }

    /// Retries only transport errors and statuses `>= 500`.
    pub fn retry_on_5xx(self) -> Self {
        self.retry_predicate(|status, _| status.is_none_or(|code| code.as_u16() >= 500))
    }

    /// Builds the client.
    ///
    /// # Errors
    /// [`HttpError::Internal`] for unparsable default headers,
    /// [`HttpError::Transport`] when the underlying client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpError::Internal {
                    message: format!("Invalid header name '{name}': {e}").into(),
                    context: None,
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| HttpError::Internal {
                message: format!("Invalid header value for '{name}': {e}").into(),
                context: None,
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs)
            .build()?;

        Ok(HttpClient {
            inner: Arc::new(Inner {
                client,
                base_url: self.base_url,
                retry_count: self.retry_count,
                retry_wait: self.retry_wait,
                max_retry_wait: self.max_retry_wait,
                success_range: self.success_range,
                max_response_size: self.max_response_size,
                retry_predicate: self.retry_predicate,
            }),
        })
    }
}

pub(crate) fn backoff(base: Duration, cap: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(100);
        let cap = Duration::from_secs(2);
        assert_eq!(backoff(base, cap, 0), Duration::from_millis(100));
        assert_eq!(backoff(base, cap, 1), Duration::from_millis(200));
        assert_eq!(backoff(base, cap, 4), Duration::from_millis(1600));
        assert_eq!(backoff(base, cap, 5), cap);
        assert_eq!(backoff(base, cap, 40), cap);
    }

    #[test]
    fn retry_on_5xx_predicate() {
        let builder = HttpClient::builder().retry_on_5xx();
        let predicate = builder.retry_predicate;
        assert!(predicate(None, "connection refused"));
        assert!(predicate(Some(StatusCode::INTERNAL_SERVER_ERROR), ""));
        assert!(predicate(Some(StatusCode::SERVICE_UNAVAILABLE), ""));
        assert!(!predicate(Some(StatusCode::NOT_FOUND), ""));
        assert!(!predicate(Some(StatusCode::BAD_REQUEST), ""));
    }

    #[test]
    fn base_url_joining() {
        let client = HttpClient::builder().base_url("http://localhost:8080/api/").build().unwrap();
        let absolute = client.resolve_url("https://other.example.com/x");
        assert_eq!(absolute, "https://other.example.com/x");
        assert_eq!(client.resolve_url("/items"), "http://localhost:8080/api/items");
        assert_eq!(client.resolve_url("items"), "http://localhost:8080/api/items");

        let bare = HttpClient::builder().build().unwrap();
        assert_eq!(bare.resolve_url("http://somewhere/x"), "http://somewhere/x");
        assert_eq!(bare.resolve_url("/x"), "/x");
    }
}
