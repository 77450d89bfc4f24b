use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// A fully buffered response.
///
/// The body is read eagerly when the request completes, so every accessor is
/// synchronous and the connection is already back in the pool.
#[derive(Debug)]
pub struct Response {
    pub(crate) url: String,
    pub(crate) status: StatusCode,
    pub(crate) content_type: Option<String>,
    pub(crate) bytes: Vec<u8>,
    pub(crate) attempts: u32,
    pub(crate) max_response_size: usize,
}

impl Response {
    /// The final status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The requested URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// How many attempts the request took, including the successful one.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The `Content-Type` header, if the server sent one.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The raw body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// Enforces the client's `max_response_size` and rejects bodies whose
    /// `Content-Type` does not look like JSON. A missing content type is
    /// tolerated and parsing is attempted anyway.
    ///
    /// # Errors
    /// [`HttpError::Internal`] for oversized bodies or non-JSON content
    /// types, [`HttpError::Json`] when deserialization fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        if self.bytes.len() > self.max_response_size {
            return Err(HttpError::Internal {
                message: format!(
                    "Response body of {} bytes exceeds limit of {} bytes",
                    self.bytes.len(),
                    self.max_response_size
                )
                .into(),
                context: None,
            });
        }

        if let Some(content_type) = &self.content_type {
            if !is_json_content_type(content_type) {
                return Err(HttpError::Internal {
                    message: format!("Expected a JSON content type, got '{content_type}'").into(),
                    context: None,
                });
            }
        }

        Ok(serde_json::from_slice(&self.bytes)?)
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence =
        content_type.split(';').next().unwrap_or(content_type).trim().to_ascii_lowercase();
    essence == "application/json" || essence == "text/json" || essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: Option<&str>, body: &str, limit: usize) -> Response {
        Response {
            url: "http://localhost/test".to_owned(),
            status: StatusCode::OK,
            content_type: content_type.map(str::to_owned),
            bytes: body.as_bytes().to_vec(),
            attempts: 1,
            max_response_size: limit,
        }
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("text/json"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("application/octet-stream"));
    }

    #[test]
    fn json_accepts_missing_content_type() {
        let value: serde_json::Value = response(None, r#"{"ok":true}"#, 1024).json().unwrap();
        assert_eq!(value["ok"], serde_json::Value::Bool(true));
    }

    #[test]
    fn json_rejects_html() {
        let err = response(Some("text/html"), "<html></html>", 1024)
            .json::<serde_json::Value>()
            .unwrap_err();
        assert!(matches!(err, HttpError::Internal { .. }));
    }

    #[test]
    fn json_enforces_size_limit() {
        let err = response(Some("application/json"), r#"{"ok":true}"#, 4)
            .json::<serde_json::Value>()
            .unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
    }

    #[test]
    fn text_is_lossy() {
        let mut resp = response(None, "", 1024);
        resp.bytes = vec![0x68, 0x69, 0xFF];
        assert_eq!(resp.text(), "hi\u{FFFD}");
    }
}
