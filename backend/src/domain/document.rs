//! Document-store addressing and field primitives.
//!
//! The backing store is a hierarchical document database: collections hold
//! documents, documents may own sub-collections. Paths alternate collection
//! names and document identifiers, so a collection path always has an odd
//! number of segments and a document path an even number.
//!
//! Domain code never concatenates path strings. Typed keys (see
//! [`crate::domain::library`]) resolve to [`CollectionPath`] and
//! [`DocumentPath`] values, and adapters decide how to render them.

use std::cmp::Ordering;
use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map stored in a document.
pub type FieldMap = Map<String, Value>;

/// Length of generated document identifiers.
pub const GENERATED_ID_LEN: usize = 20;

/// Root collection names, spelled as the browser client spells them.
pub mod collections {
    /// Course documents, parents of the library hierarchy.
    pub const COURSES: &str = "courses";
    /// Chapters under a course.
    pub const CHAPTERS: &str = "chapters";
    /// Lessons under a chapter.
    pub const LESSONS: &str = "lessons";
    /// Homeworks under a lesson.
    pub const HOMEWORKS: &str = "homeworks";
    /// Student profiles.
    pub const STUDENTS: &str = "students";
    /// Progress-tracking rows.
    pub const TABLE_DATA: &str = "tableData";
    /// Weekly schedule entries.
    pub const WEEKLY_SCHEDULE: &str = "weeklySchedule";
    /// Teacher recommendation documents keyed by student.
    pub const TEACHER_RECOMMENDATIONS: &str = "teacherRecommendations";
    /// Recommendation tabs under a student's recommendation document.
    pub const TABS: &str = "tabs";
}

/// Validation failures for path segments and field paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathValidationError {
    /// The segment is empty or blank.
    #[error("path segment must not be empty")]
    Empty,
    /// The segment contains a separator or control character.
    #[error("path segment `{segment}` contains a forbidden character")]
    ForbiddenCharacter { segment: String },
    /// The segment is a relative path component.
    #[error("path segment `{segment}` is reserved")]
    Reserved { segment: String },
}

fn validate_segment(segment: &str) -> Result<(), PathValidationError> {
    if segment.trim().is_empty() {
        return Err(PathValidationError::Empty);
    }
    if segment == "." || segment == ".." {
        return Err(PathValidationError::Reserved {
            segment: segment.to_owned(),
        });
    }
    if segment
        .chars()
        .any(|ch| ch == '/' || ch == '\\' || ch.is_control())
    {
        return Err(PathValidationError::ForbiddenCharacter {
            segment: segment.to_owned(),
        });
    }
    Ok(())
}

/// Identifier of a single document within its collection.
///
/// ## Invariants
/// - non-empty once trimmed;
/// - contains no `/`, `\` or control characters;
/// - is not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate and wrap an identifier.
    ///
    /// # Examples
    /// ```
    /// use classdesk::domain::DocumentId;
    ///
    /// assert!(DocumentId::new("algebra-101").is_ok());
    /// assert!(DocumentId::new("a/b").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, PathValidationError> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(Self(id))
    }

    /// Generate a random 20-character alphanumeric identifier.
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = PathValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

/// Path of a collection: a root name, optionally nested under documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath {
    parent: Option<Box<DocumentPath>>,
    name: &'static str,
}

impl CollectionPath {
    /// A top-level collection.
    pub const fn root(name: &'static str) -> Self {
        Self { parent: None, name }
    }

    /// A sub-collection owned by `parent`.
    pub fn nested(parent: DocumentPath, name: &'static str) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            name,
        }
    }

    /// Collection name (last segment).
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Owning document, if nested.
    pub fn parent(&self) -> Option<&DocumentPath> {
        self.parent.as_deref()
    }

    /// Address a document in this collection.
    pub fn doc(&self, id: DocumentId) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id,
        }
    }

    /// Path segments from the root.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = self
            .parent
            .as_deref()
            .map(DocumentPath::segments)
            .unwrap_or_default();
        segments.push(self.name);
        segments
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

/// Path of a single document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: DocumentId,
}

impl DocumentPath {
    /// Collection holding the document.
    pub const fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Document identifier.
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Sub-collection owned by this document.
    pub fn child(&self, name: &'static str) -> CollectionPath {
        CollectionPath::nested(self.clone(), name)
    }

    /// Path segments from the root.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = self.collection.segments();
        segments.push(self.id.as_str());
        segments
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

/// A stored document: identifier plus arbitrary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier within the collection.
    pub id: DocumentId,
    /// Stored fields.
    pub fields: FieldMap,
}

impl Document {
    /// Build a document.
    pub fn new(id: DocumentId, fields: FieldMap) -> Self {
        Self { id, fields }
    }

    /// Decode the fields into a typed view, falling back to defaults for
    /// fields the type marks `#[serde(default)]`.
    pub fn decode<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}

/// Dotted path to a (possibly nested) field, e.g. `results.files`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse a dotted field path.
    ///
    /// # Examples
    /// ```
    /// use classdesk::domain::FieldPath;
    ///
    /// let path = FieldPath::parse("results.files").expect("valid path");
    /// assert_eq!(path.segments(), ["results", "files"]);
    /// ```
    pub fn parse(dotted: &str) -> Result<Self, PathValidationError> {
        let segments = dotted
            .split('.')
            .map(|segment| {
                if segment.trim().is_empty() {
                    Err(PathValidationError::Empty)
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }

    /// A single top-level field.
    pub fn top(name: &str) -> Self {
        Self(vec![name.to_owned()])
    }

    /// A nested field from its segments.
    pub fn nested(segments: &[&str]) -> Self {
        Self(segments.iter().map(|segment| (*segment).to_owned()).collect())
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// One field-level write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Overwrite the field with a value, creating parents as needed.
    Set(FieldPath, Value),
    /// Remove the field if present.
    Delete(FieldPath),
}

impl FieldUpdate {
    /// Convenience constructor for a top-level overwrite.
    pub fn set(name: &str, value: Value) -> Self {
        Self::Set(FieldPath::top(name), value)
    }

    /// Convenience constructor for a top-level removal.
    pub fn delete(name: &str) -> Self {
        Self::Delete(FieldPath::top(name))
    }
}

/// Turn a partial field map into top-level overwrite updates.
pub fn updates_from_fields(fields: FieldMap) -> Vec<FieldUpdate> {
    fields
        .into_iter()
        .map(|(name, value)| FieldUpdate::Set(FieldPath(vec![name]), value))
        .collect()
}

/// Apply field updates in order. Non-object intermediate values are
/// replaced by objects when a nested set passes through them.
pub fn apply_updates(fields: &mut FieldMap, updates: &[FieldUpdate]) {
    for update in updates {
        match update {
            FieldUpdate::Set(path, value) => set_path(fields, path.segments(), value.clone()),
            FieldUpdate::Delete(path) => delete_path(fields, path.segments()),
        }
    }
}

fn set_path(fields: &mut FieldMap, segments: &[String], value: Value) {
    match segments {
        [] => {}
        [last] => {
            fields.insert(last.clone(), value);
        }
        [head, rest @ ..] => {
            let entry = fields
                .entry(head.clone())
                .or_insert_with(|| Value::Object(FieldMap::new()));
            if !entry.is_object() {
                *entry = Value::Object(FieldMap::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

fn delete_path(fields: &mut FieldMap, segments: &[String]) {
    match segments {
        [] => {}
        [last] => {
            fields.remove(last);
        }
        [head, rest @ ..] => {
            if let Some(Value::Object(child)) = fields.get_mut(head) {
                delete_path(child, rest);
            }
        }
    }
}

/// Read a (possibly nested) field.
pub fn field_at<'a>(fields: &'a FieldMap, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = fields.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values used for `order by` queries.
///
/// Values of different types order by type the way PostgreSQL orders
/// `jsonb` (null < string < number < bool < array < object). Numbers compare
/// numerically and strings by code point.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| compare_values(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}

/// Lenient readers used when decoding stored documents. Missing or mistyped
/// fields fall back to defaults instead of failing the read.
pub(crate) mod read {
    use serde_json::Value;

    use super::FieldMap;

    pub(crate) fn string(fields: &FieldMap, name: &str) -> String {
        match fields.get(name) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        }
    }

    pub(crate) fn optional_string(fields: &FieldMap, name: &str) -> Option<String> {
        match fields.get(name) {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        }
    }

    pub(crate) fn integer(fields: &FieldMap, name: &str) -> i64 {
        fields.get(name).and_then(as_integer).unwrap_or_default()
    }

    pub(crate) fn as_integer(value: &Value) -> Option<i64> {
        match value {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite())
                    .map(|float| float.trunc() as i64)
            }),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub(crate) fn boolean(fields: &FieldMap, name: &str) -> bool {
        matches!(fields.get(name), Some(Value::Bool(true)))
    }

    pub(crate) fn string_list(fields: &FieldMap, name: &str) -> Vec<String> {
        match fields.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Remove the named keys, leaving the fields no typed view claims.
    pub(crate) fn extra(fields: &FieldMap, known: &[&str]) -> FieldMap {
        fields
            .iter()
            .filter(|(key, _)| !known.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
