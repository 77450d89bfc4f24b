use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use toolx_kernel::server::{ApiResponse, CODE_ERROR, CODE_SUCCESS, FileResponse};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[test]
fn success_envelope_shape() {
    let body = serde_json::to_value(ApiResponse::success(json!({"id": 7}))).expect("serialize");
    assert_eq!(
        body,
        json!({
            "trace_id": "",
            "code": CODE_SUCCESS,
            "message": "success",
            "data": {"id": 7},
            "async": false,
        })
    );
}

#[test]
fn fail_and_error_envelopes() {
    let fail = ApiResponse::<Value>::fail("not allowed");
    assert_eq!(fail.code, CODE_ERROR);
    assert_eq!(fail.status(), StatusCode::OK);
    let body = serde_json::to_value(fail).expect("serialize");
    assert_eq!(body["message"], "not allowed");
    assert_eq!(body["data"], Value::Null);

    let error = ApiResponse::<Value>::error("boom");
    assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error.code, CODE_ERROR);
    assert_eq!(error.message, "boom");
}

#[test]
fn builder_overrides_and_extra_fields() {
    let response = ApiResponse::success(json!(1))
        .trace_id("t-123")
        .message("queued")
        .with_async(true)
        .field("total", 42)
        .http_status(StatusCode::ACCEPTED);

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = serde_json::to_value(response).expect("serialize");
    assert_eq!(body["trace_id"], "t-123");
    assert_eq!(body["message"], "queued");
    assert_eq!(body["async"], true);
    assert_eq!(body["total"], 42);
}

#[tokio::test]
async fn into_response_carries_status_and_json() {
    let response = ApiResponse::success(json!("ok")).http_status(StatusCode::CREATED).into_response();
    assert_eq!(response.status(), StatusCode::CREATED);
    let content_type = response.headers()[axum::http::header::CONTENT_TYPE].to_str().expect("ct");
    assert!(content_type.starts_with("application/json"));

    let body = body_json(response).await;
    assert_eq!(body["data"], "ok");
}

#[tokio::test]
async fn file_response_sets_attachment_headers() {
    let response = FileResponse::new(b"csv,data".as_slice())
        .filename("/exports/monthly report.csv")
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[axum::http::header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        headers[axum::http::header::CONTENT_DISPOSITION],
        "attachment; filename=monthly%20report.csv"
    );
}

#[tokio::test]
async fn file_response_defaults_the_name() {
    let response = FileResponse::new(vec![1u8]).into_response();
    assert_eq!(
        response.headers()[axum::http::header::CONTENT_DISPOSITION],
        "attachment; filename=download"
    );
}

#[tokio::test]
async fn empty_file_degrades_to_error_envelope() {
    let response = FileResponse::new(Vec::new()).filename("void.bin").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], CODE_ERROR);
    assert_eq!(body["message"], "empty file content");
}
