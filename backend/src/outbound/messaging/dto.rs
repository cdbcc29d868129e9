//! Wire shapes of the FCM HTTP v1 `messages:send` call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::PushMessage;

#[derive(Debug, Serialize)]
pub(super) struct SendRequestDto<'a> {
    pub message: MessageDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageDto<'a> {
    pub token: &'a str,
    pub notification: NotificationDto<'a>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(super) struct NotificationDto<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> From<&'a PushMessage> for SendRequestDto<'a> {
    fn from(message: &'a PushMessage) -> Self {
        Self {
            message: MessageDto {
                token: &message.token,
                notification: NotificationDto {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SendResponseDto {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    #[serde(default)]
    pub error: ErrorDto,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<ErrorDetailDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ErrorDetailDto {
    #[serde(default)]
    pub error_code: Option<String>,
}

impl ErrorDto {
    /// FCM-specific error code if present, otherwise the RPC status.
    pub fn code(&self) -> &str {
        self.details
            .iter()
            .find_map(|detail| detail.error_code.as_deref())
            .unwrap_or(self.status.as_str())
    }
}
