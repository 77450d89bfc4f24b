use std::time::Duration;

use reqwest::{Method, StatusCode, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{HttpClient, backoff, error::HttpError, response::Response};

/// One request in flight, rebuilt from these parts on every retry attempt.
#[derive(Debug)]
#[must_use = "A request does nothing until `send` is awaited."]
pub struct RequestBuilder {
    client: HttpClient,
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Body,
    basic_auth: Option<(String, Option<String>)>,
    bearer: Option<String>,
    timeout: Option<Duration>,
    retry_count: Option<u32>,
    retry_wait: Option<Duration>,
    ignore_status: bool,
    invalid: Option<serde_json::Error>,
}

#[derive(Debug)]
enum Body {
    None,
    Json(Value),
    Form(Vec<(String, String)>),
    Bytes(Vec<u8>),
}

enum Failure {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
}

impl RequestBuilder {
    pub(crate) fn new(client: HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: Vec::new(),
            query: Vec::new(),
            body: Body::None,
            basic_auth: None,
            bearer: None,
            timeout: None,
            retry_count: None,
            retry_wait: None,
            ignore_status: false,
            invalid: None,
        }
    }

    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends one query string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body. Serialization failures surface from [`Self::send`].
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Body::Json(value),
            Err(error) => self.invalid = Some(error),
        }
        self
    }

    /// Sets a `application/x-www-form-urlencoded` body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Sets a raw byte body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    /// Adds HTTP basic authentication.
    pub fn basic_auth(
        mut self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) -> Self {
        self.basic_auth = Some((username.into(), password.map(Into::into)));
        self
    }

    /// Adds a bearer token.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Overrides the client timeout for this request.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the client retry count for this request.
    pub const fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Overrides the client's base retry wait for this request.
    pub const fn retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = Some(wait);
        self
    }

    /// Accepts any status code instead of failing outside the success range.
    pub const fn ignore_status(mut self) -> Self {
        self.ignore_status = true;
        self
    }

    /// Sends the request, retrying failures with exponential backoff.
    ///
    /// Transport errors and out-of-range statuses both count as failures; the
    /// client's retry predicate decides which of them are worth another
    /// attempt. The delay before retry `n` is `retry_wait * 2^(n-1)`, capped
    /// at the configured maximum.
    ///
    /// # Errors
    /// The last failure once retries are exhausted or the predicate declines:
    /// [`HttpError::Transport`] or [`HttpError::Status`].
    pub async fn send(self) -> Result<Response, HttpError> {
        if let Some(error) = self.invalid {
            return Err(HttpError::from(error));
        }

        let retries = self.retry_count.unwrap_or(self.client.inner.retry_count);
        let retry_wait = self.retry_wait.unwrap_or(self.client.inner.retry_wait);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let failure = match self.build_request().send().await {
                Ok(response) => {
                    let status = response.status();
                    if self.ignore_status
                        || self.client.inner.success_range.contains(&status.as_u16())
                    {
                        let content_type = response
                            .headers()
                            .get(CONTENT_TYPE)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_owned);
                        match response.bytes().await {
                            Ok(bytes) => {
                                return Ok(Response {
                                    url: self.url.clone(),
                                    status,
                                    content_type,
                                    bytes: bytes.to_vec(),
                                    attempts,
                                    max_response_size: self.client.inner.max_response_size,
                                });
                            }
                            Err(source) => Failure::Transport(source),
                        }
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        Failure::Status { status, body }
                    }
                }
                Err(source) => Failure::Transport(source),
            };

            let retryable = attempts <= retries
                && match &failure {
                    Failure::Transport(source) => {
                        (self.client.inner.retry_predicate)(None, &source.to_string())
                    }
                    Failure::Status { status, body } => {
                        (self.client.inner.retry_predicate)(Some(*status), body)
                    }
                };

            if !retryable {
                return Err(match failure {
                    Failure::Transport(source) => HttpError::Transport { source, context: None },
                    Failure::Status { status, body } => {
                        HttpError::Status { url: self.url, status, body, context: None }
                    }
                });
            }

            let wait = backoff(retry_wait, self.client.inner.max_retry_wait, attempts - 1);
            debug!(url = %self.url, attempt = attempts, wait = ?wait, "Request failed, retrying");
            tokio::time::sleep(wait).await;
        }
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        let mut request = self.client.inner.client.request(self.method.clone(), &self.url);

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        match &self.body {
            Body::None => {}
            Body::Json(value) => request = request.json(value),
            Body::Form(fields) => request = request.form(fields),
            Body::Bytes(bytes) => request = request.body(bytes.clone()),
        }
        if let Some((username, password)) = &self.basic_auth {
            request = request.basic_auth(username, password.as_ref());
        }
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        request
    }
}
