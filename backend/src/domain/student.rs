//! Student profiles and their push-notification settings.

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::document::read;
use super::{CollectionPath, Document, DocumentId, FieldMap, FieldUpdate, collections};

/// Field names of student documents.
pub mod fields {
    /// Display name.
    pub const NAME: &str = "name";
    /// Contact e-mail.
    pub const EMAIL: &str = "email";
    /// Registered push token.
    pub const FCM_TOKEN: &str = "fcmToken";
    /// Whether push notifications may be sent.
    pub const PUSH_ENABLED: &str = "pushNotificationsEnabled";
}

/// Collection of student profiles.
pub fn students_collection() -> CollectionPath {
    CollectionPath::root(collections::STUDENTS)
}

/// A student profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Registered push token, if any.
    pub fcm_token: Option<String>,
    /// Whether push notifications may be sent.
    pub push_notifications_enabled: bool,
    /// Fields not modelled above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl Student {
    /// Decode a stored profile. A missing enablement flag reads as disabled.
    pub fn from_document(document: &Document) -> Self {
        let stored = &document.fields;
        Self {
            id: document.id.clone(),
            name: read::string(stored, fields::NAME),
            email: read::string(stored, fields::EMAIL),
            fcm_token: read::optional_string(stored, fields::FCM_TOKEN),
            push_notifications_enabled: read::boolean(stored, fields::PUSH_ENABLED),
            extra: read::extra(
                stored,
                &[
                    fields::NAME,
                    fields::EMAIL,
                    fields::FCM_TOKEN,
                    fields::PUSH_ENABLED,
                ],
            ),
        }
    }
}

/// New student profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact e-mail.
    #[serde(default)]
    pub email: String,
    /// Additional fields.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl StudentDraft {
    /// Field map to store. New students start with notifications disabled.
    pub fn into_fields(self) -> FieldMap {
        let mut stored = self.extra;
        stored.remove(fields::FCM_TOKEN);
        stored.insert(fields::NAME.to_owned(), json!(self.name));
        stored.insert(fields::EMAIL.to_owned(), json!(self.email));
        stored.insert(fields::PUSH_ENABLED.to_owned(), json!(false));
        stored
    }
}

/// Updates registering a push token and enabling notifications.
pub fn register_token_updates(token: &str) -> Vec<FieldUpdate> {
    vec![
        FieldUpdate::set(fields::FCM_TOKEN, json!(token)),
        FieldUpdate::set(fields::PUSH_ENABLED, json!(true)),
    ]
}

/// Updates discarding the push token and disabling notifications.
pub fn clear_token_updates() -> Vec<FieldUpdate> {
    vec![
        FieldUpdate::delete(fields::FCM_TOKEN),
        FieldUpdate::set(fields::PUSH_ENABLED, json!(false)),
    ]
}
