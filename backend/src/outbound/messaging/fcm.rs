//! Reqwest-backed Firebase Cloud Messaging (HTTP v1) adapter.
//!
//! The adapter owns transport details only: request serialisation, bearer
//! authentication, timeout handling and the mapping of FCM error codes onto
//! [`PushMessengerError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{ErrorEnvelopeDto, SendRequestDto, SendResponseDto};
use crate::domain::ports::{PushMessenger, PushMessengerError};
use crate::domain::{MessageId, PushMessage};

/// Public FCM endpoint.
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/";

/// Credentials and endpoint for the FCM adapter.
pub struct FcmSettings {
    /// Firebase project identifier.
    pub project_id: String,
    /// OAuth2 access token with the messaging scope.
    pub access_token: Zeroizing<String>,
    /// API origin; overridden in tests.
    pub endpoint: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Push messenger delivering through FCM.
pub struct FcmPushMessenger {
    client: Client,
    send_url: Url,
    access_token: Zeroizing<String>,
}

impl FcmPushMessenger {
    /// Build the adapter.
    ///
    /// # Errors
    /// Returns [`PushMessengerError::Rejected`] when the project id does not
    /// form a valid URL or the HTTP client cannot be constructed.
    pub fn new(settings: FcmSettings) -> Result<Self, PushMessengerError> {
        let send_url = settings
            .endpoint
            .join(&format!("v1/projects/{}/messages:send", settings.project_id))
            .map_err(|error| PushMessengerError::rejected(format!("invalid FCM URL: {error}")))?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| PushMessengerError::rejected(error.to_string()))?;
        Ok(Self {
            client,
            send_url,
            access_token: settings.access_token,
        })
    }
}

#[async_trait]
impl PushMessenger for FcmPushMessenger {
    async fn send(&self, message: &PushMessage) -> Result<MessageId, PushMessengerError> {
        let response = self
            .client
            .post(self.send_url.clone())
            .bearer_auth(self.access_token.as_str())
            .json(&SendRequestDto::from(message))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let decoded: SendResponseDto = serde_json::from_slice(&body).map_err(|error| {
            PushMessengerError::rejected(format!("invalid FCM response: {error}"))
        })?;
        Ok(MessageId(decoded.name))
    }
}

fn map_transport_error(error: reqwest::Error) -> PushMessengerError {
    PushMessengerError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PushMessengerError {
    let envelope: ErrorEnvelopeDto = serde_json::from_slice(body).unwrap_or_default();
    let code = envelope.error.code();
    let message = if envelope.error.message.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), envelope.error.message)
    };
    debug!(status = status.as_u16(), code, "FCM send failed");

    match code {
        "UNREGISTERED" | "NOT_FOUND" => PushMessengerError::unregistered(message),
        "INVALID_ARGUMENT" | "SENDER_ID_MISMATCH" => PushMessengerError::invalid_token(message),
        _ if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
            PushMessengerError::unavailable(message)
        }
        _ => PushMessengerError::rejected(message),
    }
}

#[cfg(test)]
mod tests {
    //! Mapping of FCM failures and request serialisation.

    use std::collections::BTreeMap;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn error_body(status: &str, error_code: Option<&str>) -> Vec<u8> {
        let details = error_code
            .map(|code| {
                vec![json!({
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": code
                })]
            })
            .unwrap_or_default();
        serde_json::to_vec(&json!({
            "error": { "code": 400, "message": "boom", "status": status, "details": details }
        }))
        .expect("serialise")
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, "NOT_FOUND", Some("UNREGISTERED"), true)]
    #[case(StatusCode::NOT_FOUND, "NOT_FOUND", None, true)]
    #[case(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", Some("INVALID_ARGUMENT"), true)]
    #[case(StatusCode::FORBIDDEN, "PERMISSION_DENIED", Some("SENDER_ID_MISMATCH"), true)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", Some("UNAVAILABLE"), false)]
    #[case(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", Some("THIRD_PARTY_AUTH_ERROR"), false)]
    fn classifies_stale_tokens(
        #[case] status: StatusCode,
        #[case] rpc_status: &str,
        #[case] error_code: Option<&str>,
        #[case] stale: bool,
    ) {
        let error = map_status_error(status, &error_body(rpc_status, error_code));
        assert_eq!(error.is_stale_token(), stale, "{error}");
    }

    #[rstest]
    fn server_errors_are_unavailable() {
        let error = map_status_error(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        assert!(matches!(error, PushMessengerError::Unavailable { .. }));
    }

    #[rstest]
    fn request_body_nests_notification_and_data() {
        let message = PushMessage {
            token: "tok".to_owned(),
            title: "Homework".to_owned(),
            body: "Due".to_owned(),
            data: BTreeMap::from([("lessonId".to_owned(), "l1".to_owned())]),
        };
        let value = serde_json::to_value(SendRequestDto::from(&message)).expect("serialise");
        assert_eq!(
            value,
            json!({
                "message": {
                    "token": "tok",
                    "notification": { "title": "Homework", "body": "Due" },
                    "data": { "lessonId": "l1" }
                }
            })
        );
    }

    #[rstest]
    fn builds_project_scoped_url() {
        let messenger = FcmPushMessenger::new(FcmSettings {
            project_id: "classdesk-dev".to_owned(),
            access_token: Zeroizing::new("secret".to_owned()),
            endpoint: Url::parse(DEFAULT_FCM_ENDPOINT).expect("url"),
            timeout: Duration::from_secs(5),
        })
        .expect("messenger");
        assert_eq!(
            messenger.send_url.as_str(),
            "https://fcm.googleapis.com/v1/projects/classdesk-dev/messages:send"
        );
    }
}
