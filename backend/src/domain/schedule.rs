//! Weekly schedule entries.

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::document::read;
use super::{CollectionPath, Document, DocumentId, FieldMap, collections};

/// Field names of schedule documents.
pub mod fields {
    /// Owning student.
    pub const STUDENT_ID: &str = "studentId";
    /// Day of the week.
    pub const DAY: &str = "day";
    /// Time of day, `HH:MM`.
    pub const TIME: &str = "time";
    /// Subject taught.
    pub const SUBJECT: &str = "subject";
}

/// Collection of schedule entries.
pub fn schedule_collection() -> CollectionPath {
    CollectionPath::root(collections::WEEKLY_SCHEDULE)
}

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Position of a day name in the week, Monday first. Unknown names sort last.
pub fn weekday_rank(day: &str) -> usize {
    let lowered = day.trim().to_lowercase();
    WEEKDAYS
        .iter()
        .position(|name| *name == lowered || name.get(..3) == Some(lowered.as_str()))
        .unwrap_or(WEEKDAYS.len())
}

/// One recurring lesson slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Owning student.
    pub student_id: String,
    /// Day of the week.
    pub day: String,
    /// Time of day.
    pub time: String,
    /// Subject taught.
    pub subject: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl ScheduleEntry {
    /// Decode a stored entry.
    pub fn from_document(document: &Document) -> Self {
        let stored = &document.fields;
        Self {
            id: document.id.clone(),
            student_id: read::string(stored, fields::STUDENT_ID),
            day: read::string(stored, fields::DAY),
            time: read::string(stored, fields::TIME),
            subject: read::string(stored, fields::SUBJECT),
            extra: read::extra(
                stored,
                &[fields::STUDENT_ID, fields::DAY, fields::TIME, fields::SUBJECT],
            ),
        }
    }
}

/// Order entries Monday to Sunday, then by time, then by id.
pub fn sort_week(entries: &mut [ScheduleEntry]) {
    entries.sort_by(|left, right| {
        weekday_rank(&left.day)
            .cmp(&weekday_rank(&right.day))
            .then_with(|| left.time.cmp(&right.time))
            .then_with(|| left.id.cmp(&right.id))
    });
}

/// New schedule entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    /// Day of the week.
    #[serde(default)]
    pub day: String,
    /// Time of day.
    #[serde(default)]
    pub time: String,
    /// Subject taught.
    #[serde(default)]
    pub subject: String,
    /// Additional fields.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl ScheduleDraft {
    /// Field map to store for `student_id`.
    pub fn into_fields(self, student_id: &DocumentId) -> FieldMap {
        let mut stored = self.extra;
        stored.insert(fields::STUDENT_ID.to_owned(), json!(student_id.as_str()));
        stored.insert(fields::DAY.to_owned(), json!(self.day));
        stored.insert(fields::TIME.to_owned(), json!(self.time));
        stored.insert(fields::SUBJECT.to_owned(), json!(self.subject));
        stored
    }
}
