//! End-to-end behaviour of `/api/v1/notifications/send`.
//!
//! Students are registered through the HTTP surface and the messenger is a
//! recording double, so these tests observe both the response contract and
//! the token clean-up written back to the store.

mod support;

use std::sync::Arc;

use actix_web::http::{Method, StatusCode, header};
use actix_web::test::{self, TestRequest};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use support::{Delivery, RecordingMessenger, app, http_state};

const ORIGIN: &str = "https://teacher.example.test";

#[fixture]
fn accepting() -> Arc<RecordingMessenger> {
    Arc::new(RecordingMessenger::new(Delivery::Accept))
}

async fn register_student<S, B>(app: &S, token: Option<&str>) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let created: Value = test::call_and_read_body_json(
        app,
        TestRequest::post()
            .uri("/api/v1/students")
            .set_json(json!({ "name": "Ada", "email": "ada@example.test" }))
            .to_request(),
    )
    .await;
    let id = created["id"].as_str().expect("student id").to_owned();
    if let Some(token) = token {
        let response = test::call_service(
            app,
            TestRequest::put()
                .uri(&format!("/api/v1/students/{id}/push-token"))
                .set_json(json!({ "token": token }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
    id
}

fn send(payload: &Value) -> actix_http::Request {
    TestRequest::post()
        .uri("/api/v1/notifications/send")
        .set_json(payload)
        .to_request()
}

#[rstest]
#[actix_web::test]
async fn delivers_to_the_stored_token(accepting: Arc<RecordingMessenger>) {
    let app = test::init_service(app(http_state(accepting.clone()))).await;
    let user = register_student(&app, Some("device-1")).await;

    let response = test::call_service(
        &app,
        send(&json!({
            "userId": user,
            "title": "Homework",
            "body": "Due tomorrow",
            "data": { "lesson": 3, "urgent": true }
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(ORIGIN)
    );
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["messageId"], json!("projects/classdesk/messages/1"));

    let sent = accepting.sent();
    let message = sent.first().expect("one message");
    assert_eq!(message.token, "device-1");
    assert_eq!(message.data.get("lesson").map(String::as_str), Some("3"));
    assert_eq!(message.data.get("urgent").map(String::as_str), Some("true"));
}

#[rstest]
#[actix_web::test]
async fn unregistered_token_is_cleared_from_the_student() {
    let messenger = Arc::new(RecordingMessenger::new(Delivery::Unregistered));
    let app = test::init_service(app(http_state(messenger))).await;
    let user = register_student(&app, Some("stale")).await;

    let response = test::call_service(
        &app,
        send(&json!({ "userId": user, "title": "Hi", "body": "There" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!("TOKEN_UNREGISTERED"));

    let student: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/students/{user}"))
            .to_request(),
    )
    .await;
    assert_eq!(student["fcmToken"], Value::Null);
    assert_eq!(student["pushNotificationsEnabled"], json!(false));

    let retry = test::call_service(
        &app,
        send(&json!({ "userId": user, "title": "Hi", "body": "Again" })),
    )
    .await;
    let body: Value = test::read_body_json(retry).await;
    assert_eq!(body["code"], json!("NOTIFICATIONS_DISABLED"));
}

#[rstest]
#[case(json!({ "userId": "s1", "body": "x" }), "MISSING_FIELDS")]
#[case(json!({}), "MISSING_FIELDS")]
#[case(json!({ "userId": "s1", "title": "  ", "body": "x" }), "MISSING_FIELDS")]
#[actix_web::test]
async fn incomplete_requests_never_reach_the_messenger(
    accepting: Arc<RecordingMessenger>,
    #[case] payload: Value,
    #[case] code: &str,
) {
    let app = test::init_service(app(http_state(accepting.clone()))).await;

    let response = test::call_service(&app, send(&payload)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!(code));
    assert!(accepting.sent().is_empty());
}

#[rstest]
#[actix_web::test]
async fn unknown_user_is_not_found(accepting: Arc<RecordingMessenger>) {
    let app = test::init_service(app(http_state(accepting))).await;

    let response = test::call_service(
        &app,
        send(&json!({ "userId": "nobody", "title": "Hi", "body": "There" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!("USER_NOT_FOUND"));
}

#[rstest]
#[actix_web::test]
async fn clearing_the_token_disables_notifications(accepting: Arc<RecordingMessenger>) {
    let app = test::init_service(app(http_state(accepting.clone()))).await;
    let user = register_student(&app, Some("device-1")).await;
    let response = test::call_service(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/v1/students/{user}/push-token"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test::call_service(
        &app,
        send(&json!({ "userId": user, "title": "Hi", "body": "There", "fcmToken": "device-2" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!("NOTIFICATIONS_DISABLED"));
    assert!(accepting.sent().is_empty());
}

#[rstest]
#[case(Method::GET, StatusCode::METHOD_NOT_ALLOWED)]
#[case(Method::PUT, StatusCode::METHOD_NOT_ALLOWED)]
#[case(Method::OPTIONS, StatusCode::NO_CONTENT)]
#[actix_web::test]
async fn non_post_methods_carry_cors_headers(
    accepting: Arc<RecordingMessenger>,
    #[case] method: Method,
    #[case] status: StatusCode,
) {
    let app = test::init_service(app(http_state(accepting))).await;

    let response = test::call_service(
        &app,
        TestRequest::default()
            .method(method)
            .uri("/api/v1/notifications/send")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), status);
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS)
    );
}
