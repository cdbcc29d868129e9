//! Push notification send endpoint.
//!
//! ```text
//! POST    /api/v1/notifications/send
//! OPTIONS /api/v1/notifications/send
//! ```
//!
//! Browsers call this endpoint cross-origin, so every response on the
//! resource, errors included, carries the CORS headers. Methods other than
//! `POST` and `OPTIONS` answer `405 METHOD_NOT_ALLOWED`.

use actix_web::http::Method;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, Resource, ResponseError, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{Error, PushRequest};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Send request body. Every field is optional on the wire so missing ones
/// can be reported together.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[schema(example = "Xk2v9QpL0aZ3mB7nT1cR")]
    pub user_id: Option<String>,
    #[schema(example = "New homework")]
    pub title: Option<String>,
    #[schema(example = "Chapter 3 exercises are due Friday")]
    pub body: Option<String>,
    /// Extra payload; values are sent as strings.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Option<Map<String, Value>>,
    /// Token to use instead of the stored one.
    pub fcm_token: Option<String>,
}

impl From<SendNotificationRequest> for PushRequest {
    fn from(value: SendNotificationRequest) -> Self {
        Self {
            user_id: value.user_id,
            title: value.title,
            body: value.body,
            data: value.data.unwrap_or_default(),
            fcm_token: value.fcm_token,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    #[schema(example = "projects/classdesk/messages/0:1700000000000000%abc")]
    pub message_id: String,
}

fn with_cors(mut response: HttpResponse, origin: &str) -> HttpResponse {
    let headers = response.headers_mut();
    match HeaderValue::from_str(origin) {
        Ok(value) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(error) => warn!(%error, origin, "configured CORS origin is not a valid header value"),
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

fn parse_body(body: &[u8]) -> Result<PushRequest, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PushRequest::default());
    }
    serde_json::from_slice::<SendNotificationRequest>(body)
        .map(PushRequest::from)
        .map_err(|err| Error::invalid_request(format!("malformed request body: {err}")))
}

/// Send a push notification to a student.
///
/// A token the messaging backend no longer recognises is removed from the
/// student and notifications are switched off before `TOKEN_UNREGISTERED`
/// is returned.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/send",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification sent", body = SendNotificationResponse),
        (status = 400, description = "MISSING_FIELDS, NOTIFICATIONS_DISABLED, INVALID_TOKEN or TOKEN_UNREGISTERED", body = ErrorSchema),
        (status = 404, description = "USER_NOT_FOUND", body = ErrorSchema),
        (status = 405, description = "METHOD_NOT_ALLOWED", body = ErrorSchema),
        (status = 500, description = "Messaging failure", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "sendNotification"
)]
pub async fn send_notification(state: web::Data<HttpState>, body: web::Bytes) -> HttpResponse {
    let outcome = match parse_body(&body) {
        Ok(request) => state.push.send(request).await,
        Err(error) => Err(error),
    };
    let response = match outcome {
        Ok(receipt) => HttpResponse::Ok().json(SendNotificationResponse {
            success: true,
            message_id: receipt.message_id.to_string(),
        }),
        Err(error) => error.error_response(),
    };
    with_cors(response, &state.cors_allowed_origin)
}

async fn preflight(state: web::Data<HttpState>) -> HttpResponse {
    with_cors(HttpResponse::NoContent().finish(), &state.cors_allowed_origin)
}

async fn method_not_allowed(state: web::Data<HttpState>, request: HttpRequest) -> HttpResponse {
    let error = Error::method_not_allowed(format!("method {} not allowed", request.method()));
    let mut response = error.error_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    with_cors(response, &state.cors_allowed_origin)
}

/// Resource for `/notifications/send`, mounted inside the API scope.
pub fn notifications_resource() -> Resource {
    web::resource("/notifications/send")
        .route(web::post().to(send_notification))
        .route(web::method(Method::OPTIONS).to(preflight))
        .default_service(web::to(method_not_allowed))
}
