//! Student progress rows (`tableData`) and their derived views.
//!
//! Rows reference course, chapter and lesson by identifier only. The join
//! against the library happens at read time and tolerates dangling ids.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::document::read;
use super::{
    CollectionPath, Document, DocumentId, FieldMap, FieldPath, ResolvedRefs, collections,
};

/// Field names of progress rows.
pub mod fields {
    /// Owning student.
    pub const STUDENT_ID: &str = "studentId";
    /// Calendar date, `YYYY-MM-DD`.
    pub const DATE: &str = "date";
    /// Referenced course.
    pub const COURSE_ID: &str = "courseId";
    /// Referenced chapter.
    pub const CHAPTER_ID: &str = "chapterId";
    /// Referenced lesson.
    pub const LESSON_ID: &str = "lessonId";
    /// Progress value; empty until the work is graded.
    pub const PROGRESS: &str = "progress";
    /// Files the student handed in.
    pub const SUBMITTED_FILES: &str = "submittedFiles";
    /// Files returned after checking.
    pub const CHECKED_FILES: &str = "checkedFiles";
    /// Result object holding `percentage` and `files`.
    pub const RESULTS: &str = "results";
    /// Creation time in epoch milliseconds, the pagination key.
    pub const TIMESTAMP: &str = "timestamp";
}

/// Collection of progress rows.
pub fn table_collection() -> CollectionPath {
    CollectionPath::root(collections::TABLE_DATA)
}

/// Array fields holding file URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FileField {
    /// `submittedFiles`.
    #[serde(rename = "submittedFiles")]
    Submitted,
    /// `checkedFiles`.
    #[serde(rename = "checkedFiles")]
    Checked,
    /// `results.files`.
    #[serde(rename = "results.files")]
    Results,
}

impl FileField {
    /// Stored field path.
    pub fn path(self) -> FieldPath {
        match self {
            Self::Submitted => FieldPath::top(fields::SUBMITTED_FILES),
            Self::Checked => FieldPath::top(fields::CHECKED_FILES),
            Self::Results => FieldPath::nested(&[fields::RESULTS, "files"]),
        }
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submittedFiles",
            Self::Checked => "checkedFiles",
            Self::Results => "results.files",
        }
    }
}

/// Numeric percentage fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PercentField {
    /// `progress`.
    #[serde(rename = "progress")]
    Progress,
    /// `results.percentage`.
    #[serde(rename = "results.percentage")]
    Results,
}

impl PercentField {
    /// Stored field path.
    pub fn path(self) -> FieldPath {
        match self {
            Self::Progress => FieldPath::top(fields::PROGRESS),
            Self::Results => FieldPath::nested(&[fields::RESULTS, "percentage"]),
        }
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Results => "results.percentage",
        }
    }
}

/// Unknown field name in a path parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for FileField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Submitted, Self::Checked, Self::Results]
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_owned()))
    }
}

impl FromStr for PercentField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Progress, Self::Results]
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_owned()))
    }
}

/// Result block of a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressResults {
    /// Score, when graded.
    pub percentage: Option<f64>,
    /// Result file URLs.
    pub files: Vec<String>,
}

/// Derived display bucket of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgressView {
    /// Progress recorded.
    Completed,
    /// Due today or earlier, not yet graded.
    Homework,
    /// Scheduled after today.
    Future,
}

/// One progress row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRow {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Owning student.
    pub student_id: String,
    /// Calendar date as stored.
    pub date: String,
    /// Referenced course.
    pub course_id: Option<String>,
    /// Referenced chapter.
    pub chapter_id: Option<String>,
    /// Referenced lesson.
    pub lesson_id: Option<String>,
    /// Progress value exactly as stored.
    #[schema(value_type = Object)]
    pub progress: Value,
    /// Submitted file URLs.
    pub submitted_files: Vec<String>,
    /// Checked file URLs.
    pub checked_files: Vec<String>,
    /// Results block.
    pub results: ProgressResults,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Fields not modelled above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

const KNOWN_FIELDS: [&str; 10] = [
    fields::STUDENT_ID,
    fields::DATE,
    fields::COURSE_ID,
    fields::CHAPTER_ID,
    fields::LESSON_ID,
    fields::PROGRESS,
    fields::SUBMITTED_FILES,
    fields::CHECKED_FILES,
    fields::RESULTS,
    fields::TIMESTAMP,
];

impl ProgressRow {
    /// Decode a stored row leniently.
    pub fn from_document(document: &Document) -> Self {
        let stored = &document.fields;
        let results = match stored.get(fields::RESULTS) {
            Some(Value::Object(block)) => ProgressResults {
                percentage: block.get("percentage").and_then(Value::as_f64),
                files: read::string_list(block, "files"),
            },
            _ => ProgressResults::default(),
        };
        Self {
            id: document.id.clone(),
            student_id: read::string(stored, fields::STUDENT_ID),
            date: read::string(stored, fields::DATE),
            course_id: read::optional_string(stored, fields::COURSE_ID),
            chapter_id: read::optional_string(stored, fields::CHAPTER_ID),
            lesson_id: read::optional_string(stored, fields::LESSON_ID),
            progress: stored.get(fields::PROGRESS).cloned().unwrap_or(Value::Null),
            submitted_files: read::string_list(stored, fields::SUBMITTED_FILES),
            checked_files: read::string_list(stored, fields::CHECKED_FILES),
            results,
            timestamp: read::integer(stored, fields::TIMESTAMP),
            extra: read::extra(stored, &KNOWN_FIELDS),
        }
    }

    /// Whether a progress value has been recorded.
    pub fn has_progress(&self) -> bool {
        match &self.progress {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Bool(_) | Value::Number(_) => true,
        }
    }

    /// Derive the display bucket relative to `today`.
    ///
    /// Rows with progress are completed. Ungraded rows dated after today are
    /// future work; everything else, including unparseable dates, is homework.
    pub fn view(&self, today: NaiveDate) -> ProgressView {
        if self.has_progress() {
            return ProgressView::Completed;
        }
        match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
            Ok(date) if date > today => ProgressView::Future,
            _ => ProgressView::Homework,
        }
    }

    /// Current contents of a file array.
    pub fn files(&self, field: FileField) -> &[String] {
        match field {
            FileField::Submitted => &self.submitted_files,
            FileField::Checked => &self.checked_files,
            FileField::Results => &self.results.files,
        }
    }
}

/// Keyset position encoded into page cursors.
///
/// The timestamp is the raw stored value, not the leniently decoded one, so
/// the store resumes on exactly the value it sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCursorKey {
    /// Stored timestamp of the last returned row; `null` when absent.
    pub timestamp: Value,
    /// Identifier of the last returned row.
    pub id: String,
}

impl ProgressCursorKey {
    /// Keyset position of a stored row.
    pub fn of(document: &Document) -> Self {
        Self {
            timestamp: document
                .fields
                .get(fields::TIMESTAMP)
                .cloned()
                .unwrap_or(Value::Null),
            id: document.id.as_str().to_owned(),
        }
    }
}

/// New progress row. The timestamp is stamped by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDraft {
    /// Owning student.
    pub student_id: String,
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    /// Referenced course.
    #[serde(default)]
    pub course_id: Option<String>,
    /// Referenced chapter.
    #[serde(default)]
    pub chapter_id: Option<String>,
    /// Referenced lesson.
    #[serde(default)]
    pub lesson_id: Option<String>,
    /// Initial progress, usually empty.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub progress: Value,
    /// Additional fields.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl ProgressDraft {
    /// Field map to store, with empty file arrays and results block.
    pub fn into_fields(self, timestamp: i64) -> FieldMap {
        let mut stored = self.extra;
        stored.insert(fields::STUDENT_ID.to_owned(), json!(self.student_id));
        stored.insert(fields::DATE.to_owned(), json!(self.date));
        stored.insert(fields::COURSE_ID.to_owned(), json!(self.course_id));
        stored.insert(fields::CHAPTER_ID.to_owned(), json!(self.chapter_id));
        stored.insert(fields::LESSON_ID.to_owned(), json!(self.lesson_id));
        let progress = if self.progress.is_null() {
            json!("")
        } else {
            self.progress
        };
        stored.insert(fields::PROGRESS.to_owned(), progress);
        stored.insert(fields::SUBMITTED_FILES.to_owned(), json!([]));
        stored.insert(fields::CHECKED_FILES.to_owned(), json!([]));
        stored.insert(
            fields::RESULTS.to_owned(),
            json!({ "percentage": null, "files": [] }),
        );
        stored.insert(fields::TIMESTAMP.to_owned(), json!(timestamp));
        stored
    }
}

/// Row joined with the library names it references.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinedProgressRow {
    /// The stored row.
    #[serde(flatten)]
    pub row: ProgressRow,
    /// Resolved library references; `None` when dangling.
    #[serde(flatten)]
    pub refs: ResolvedRefs,
    /// Derived display bucket.
    pub view: ProgressView,
}

/// One page of progress rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPage<T> {
    /// Rows in timestamp-descending order.
    pub rows: Vec<T>,
    /// Cursor for the next page, absent on the last page.
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Lenient decoding and view derivation.

    use rstest::rstest;

    use super::*;

    fn row(progress: Value, date: &str) -> ProgressRow {
        let stored = json!({ "studentId": "s1", "date": date, "progress": progress, "timestamp": 5 })
            .as_object()
            .cloned()
            .expect("object");
        ProgressRow::from_document(&Document::new(
            DocumentId::new("r1").expect("id"),
            stored,
        ))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date")
    }

    #[rstest]
    #[case(json!("80"), "2024-03-20", ProgressView::Completed)]
    #[case(json!(75), "2024-03-01", ProgressView::Completed)]
    #[case(json!(""), "2024-03-11", ProgressView::Future)]
    #[case(json!(null), "2024-03-10", ProgressView::Homework)]
    #[case(json!("  "), "2024-03-01", ProgressView::Homework)]
    #[case(json!(""), "next tuesday", ProgressView::Homework)]
    fn view_depends_on_progress_then_date(
        #[case] progress: Value,
        #[case] date: &str,
        #[case] expected: ProgressView,
    ) {
        assert_eq!(row(progress, date).view(today()), expected);
    }

    #[rstest]
    fn missing_fields_decode_to_defaults() {
        let decoded = row(json!(null), "2024-03-01");
        assert!(decoded.submitted_files.is_empty());
        assert_eq!(decoded.results, ProgressResults::default());
        assert_eq!(decoded.timestamp, 5);
        assert!(decoded.course_id.is_none());
    }

    #[rstest]
    #[case("submittedFiles", FileField::Submitted)]
    #[case("checkedFiles", FileField::Checked)]
    #[case("results.files", FileField::Results)]
    fn file_fields_parse_from_wire_names(#[case] raw: &str, #[case] expected: FileField) {
        assert_eq!(raw.parse::<FileField>(), Ok(expected));
    }

    #[rstest]
    fn unknown_percentage_field_is_rejected() {
        assert!("timestamp".parse::<PercentField>().is_err());
    }

    #[rstest]
    fn draft_initialises_empty_collections() {
        let stored = ProgressDraft {
            student_id: "s1".to_owned(),
            ..ProgressDraft::default()
        }
        .into_fields(1_700_000_000_000);
        assert_eq!(stored.get("submittedFiles"), Some(&json!([])));
        assert_eq!(stored.get("progress"), Some(&json!("")));
        assert_eq!(stored.get("timestamp"), Some(&json!(1_700_000_000_000_i64)));
    }
}
