//! HTTP server layer: response envelope, extractors and field validators.

pub mod extract;
pub mod health;
pub mod response;
pub mod validate;

pub use extract::{ApiJson, ApiPath, ApiQuery, TraceId};
pub use health::health_router;
pub use response::{ApiResponse, CODE_ERROR, CODE_SUCCESS, FileResponse, TRACE_HEADER};
