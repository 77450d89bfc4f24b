use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

/// Business code of a successful response.
pub const CODE_SUCCESS: i32 = 0;
/// Business code of a failed response.
pub const CODE_ERROR: i32 = 1;

/// Request header carrying the caller's trace id.
pub const TRACE_HEADER: &str = "private-trace-id";

const DEFAULT_MESSAGE: &str = "success";
const DEFAULT_FILENAME: &str = "download";

/// JSON response envelope shared by every handler.
///
/// Serializes as `{"trace_id", "code", "message", "data", "async"}` plus any
/// extra top-level fields added with [`ApiResponse::field`]. The HTTP status
/// travels alongside the envelope but is never part of the body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T = Value> {
    pub trace_id: String,
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    http_status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success envelope: code `0`, message `"success"`, HTTP 200.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            trace_id: String::new(),
            code: CODE_SUCCESS,
            message: DEFAULT_MESSAGE.to_owned(),
            data: Some(data),
            is_async: false,
            extra: Map::new(),
            http_status: StatusCode::OK,
        }
    }

    /// Business failure: code `1`, no data, HTTP 200.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            trace_id: String::new(),
            code: CODE_ERROR,
            message: message.into(),
            data: None,
            is_async: false,
            extra: Map::new(),
            http_status: StatusCode::OK,
        }
    }

    /// Error envelope: message from the error display, code `1`, HTTP 400.
    #[must_use]
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::fail(err.to_string()).http_status(StatusCode::BAD_REQUEST)
    }

    #[must_use]
    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn http_status(mut self, status: StatusCode) -> Self {
        self.http_status = status;
        self
    }

    /// Marks the response as accepted-for-async-processing.
    #[must_use]
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Adds an extra top-level field to the envelope.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.http_status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.http_status;
        (status, Json(self)).into_response()
    }
}

/// Binary download response: `application/octet-stream` with an attachment
/// `Content-Disposition`. Empty payloads degrade to the error envelope.
#[derive(Debug)]
pub struct FileResponse {
    bytes: Vec<u8>,
    filename: String,
}

impl FileResponse {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), filename: DEFAULT_FILENAME.to_owned() }
    }

    /// Sets the download name; only the base name is kept and it is
    /// percent-escaped for the header.
    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }
}

impl IntoResponse for FileResponse {
    fn into_response(self) -> Response {
        if self.bytes.is_empty() {
            return ApiResponse::<Value>::error("empty file content").into_response();
        }
        let disposition = format!("attachment; filename={}", escape_filename(&self.filename));
        (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

// Base name only, percent-escaped so the header value stays ASCII.
fn escape_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let base = if base.is_empty() { DEFAULT_FILENAME } else { base };

    let mut escaped = String::with_capacity(base.len());
    for byte in base.bytes() {
        match byte {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'.' | b'_' | b'~' => {
                escaped.push(char::from(byte));
            }
            _ => escaped.push_str(&format!("%{byte:02X}")),
        }
    }
    escaped
}
