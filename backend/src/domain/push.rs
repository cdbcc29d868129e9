//! Push notification requests and messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Error;

/// Identifier the messaging backend assigns to a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message handed to the push messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// Device registration token.
    pub token: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Data payload; values are always strings.
    pub data: BTreeMap<String, String>,
}

/// Incoming send request, exactly as the client posted it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushRequest {
    /// Target student.
    pub user_id: Option<String>,
    /// Notification title.
    pub title: Option<String>,
    /// Notification body.
    pub body: Option<String>,
    /// Arbitrary data payload.
    pub data: Map<String, Value>,
    /// Token overriding the stored one.
    pub fcm_token: Option<String>,
}

/// Request whose required fields are present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPushRequest {
    /// Target student.
    pub user_id: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Stringified data payload.
    pub data: BTreeMap<String, String>,
    /// Token overriding the stored one.
    pub fcm_token: Option<String>,
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned)
}

/// Render a data value as a string payload entry.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl PushRequest {
    /// Check required fields. The error names every missing field.
    ///
    /// # Examples
    /// ```
    /// use classdesk::domain::{ErrorCode, PushRequest};
    ///
    /// let err = PushRequest::default().validate().expect_err("nothing supplied");
    /// assert_eq!(err.code(), ErrorCode::MissingFields);
    /// assert!(err.message().contains("userId, title, body"));
    /// ```
    pub fn validate(&self) -> Result<ValidPushRequest, Error> {
        let user_id = present(self.user_id.as_ref());
        let title = present(self.title.as_ref());
        let body = present(self.body.as_ref());

        let missing: Vec<&str> = [
            ("userId", user_id.is_none()),
            ("title", title.is_none()),
            ("body", body.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (user_id, title, body) {
            (Some(user_id), Some(title), Some(body)) => Ok(ValidPushRequest {
                user_id,
                title,
                body,
                data: self
                    .data
                    .iter()
                    .map(|(key, value)| (key.clone(), stringify(value)))
                    .collect(),
                fcm_token: present(self.fcm_token.as_ref()),
            }),
            _ => Err(Error::missing_fields(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))
            .with_details(serde_json::json!({ "fields": missing }))),
        }
    }
}

/// Successful send outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    /// Backend message identifier.
    pub message_id: MessageId,
}
