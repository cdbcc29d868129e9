//! Status mapping and payload redaction.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::missing_fields("title"), StatusCode::BAD_REQUEST)]
#[case(Error::notifications_disabled("off"), StatusCode::BAD_REQUEST)]
#[case(Error::invalid_token("none"), StatusCode::BAD_REQUEST)]
#[case(Error::token_unregistered("stale"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::user_not_found("who"), StatusCode::NOT_FOUND)]
#[case(Error::method_not_allowed("GET"), StatusCode::METHOD_NOT_ALLOWED)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("read body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, header, value)
}

#[actix_web::test]
async fn internal_errors_are_redacted() {
    let error = Error::internal("connection string leaked")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }));
    let (status, header, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({ "code": "INTERNAL_ERROR", "message": "Internal server error", "traceId": TRACE_ID })
    );
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::missing_fields("missing required fields: title")
        .with_details(json!({ "fields": ["title"] }));
    let (status, header, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(body["code"], "MISSING_FIELDS");
    assert_eq!(body["message"], "missing required fields: title");
    assert_eq!(body["details"], json!({ "fields": ["title"] }));
}

#[rstest]
fn actix_errors_become_internal() {
    let actix = actix_web::error::ErrorBadGateway("upstream");
    let error = Error::from(actix);
    assert_eq!(error.code(), ErrorCode::InternalError);
}
