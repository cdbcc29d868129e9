//! Uploads, retrieval URLs and blob download through the public routes.

mod support;

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use rstest::rstest;
use serde_json::{Value, json};
use url::Url;

use support::{Delivery, PUBLIC_BASE, RecordingMessenger, app, http_state};

fn messenger() -> Arc<RecordingMessenger> {
    Arc::new(RecordingMessenger::new(Delivery::Accept))
}

/// Path and query of a URL handed out by the blob store.
fn local_path(url: &str) -> String {
    let parsed = Url::parse(url).expect("absolute url");
    assert!(url.starts_with(PUBLIC_BASE), "{url} outside public base");
    parsed.path().to_owned()
}

#[rstest]
#[actix_web::test]
async fn loose_file_round_trip() {
    let app = test::init_service(app(http_state(messenger()))).await;

    let stored: Value = test::call_and_read_body_json(
        &app,
        TestRequest::put()
            .uri("/api/v1/files/worksheet.pdf")
            .insert_header((header::CONTENT_TYPE, "application/pdf"))
            .set_payload("%PDF-1.7")
            .to_request(),
    )
    .await;
    assert_eq!(stored["name"], json!("worksheet.pdf"));
    let uploaded_url = stored["url"].as_str().expect("url").to_owned();

    let located: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get()
            .uri("/api/v1/files/worksheet.pdf")
            .to_request(),
    )
    .await;
    assert_eq!(located["url"], json!(uploaded_url));

    let response = test::call_service(
        &app,
        TestRequest::get()
            .uri(&local_path(&uploaded_url))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/pdf")
    );
    let body = test::read_body(response).await;
    assert_eq!(body.as_ref(), b"%PDF-1.7");

    let response = test::call_service(
        &app,
        TestRequest::delete()
            .uri("/api/v1/files/worksheet.pdf")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test::call_service(
        &app,
        TestRequest::get()
            .uri(&local_path(&uploaded_url))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn homework_files_are_scoped_to_their_homework() {
    let app = test::init_service(app(http_state(messenger()))).await;
    let base = "/api/v1/courses/c1/chapters/ch1/lessons/l1/homeworks";

    let stored: Value = test::call_and_read_body_json(
        &app,
        TestRequest::put()
            .uri(&format!("{base}/h1/files/answers.txt"))
            .set_payload("42")
            .to_request(),
    )
    .await;
    let url = stored["url"].as_str().expect("url").to_owned();

    let response = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("{base}/h2/files/answers.txt"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test::call_service(
        &app,
        TestRequest::get().uri(&local_path(&url)).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/octet-stream")
    );
}

#[rstest]
#[case("/api/v1/files/empty.txt", "")]
#[case("/api/v1/files/%2E%2E", "content")]
#[actix_web::test]
async fn rejected_uploads_are_bad_requests(#[case] uri: &str, #[case] payload: &'static str) {
    let app = test::init_service(app(http_state(messenger()))).await;

    let response = test::call_service(
        &app,
        TestRequest::put().uri(uri).set_payload(payload).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
