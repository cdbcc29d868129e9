//! Course library: the courses → chapters → lessons → homeworks hierarchy.
//!
//! Every level is a sub-collection of its parent document. Keys carry all
//! ancestor identifiers so a path can be produced without lookups.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::document::read;
use super::{
    CollectionPath, Document, DocumentId, DocumentPath, FieldMap, FieldUpdate, FileRef,
    collections,
};

/// Field names of library documents.
pub mod fields {
    /// Display name of a course, chapter or lesson.
    pub const NAME: &str = "name";
    /// Ordinal within the sibling group.
    pub const ORDER: &str = "order";
    /// Lesson description.
    pub const DESCRIPTION: &str = "description";
    /// Homework text.
    pub const TEXT: &str = "text";
    /// Homework attachments.
    pub const FILES: &str = "files";
}

/// Key of a course document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseKey {
    /// Course identifier.
    pub course: DocumentId,
}

/// Key of a chapter document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    /// Owning course identifier.
    pub course: DocumentId,
    /// Chapter identifier.
    pub chapter: DocumentId,
}

/// Key of a lesson document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LessonKey {
    /// Owning course identifier.
    pub course: DocumentId,
    /// Owning chapter identifier.
    pub chapter: DocumentId,
    /// Lesson identifier.
    pub lesson: DocumentId,
}

/// Key of a homework document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HomeworkKey {
    /// Owning course identifier.
    pub course: DocumentId,
    /// Owning chapter identifier.
    pub chapter: DocumentId,
    /// Owning lesson identifier.
    pub lesson: DocumentId,
    /// Homework identifier.
    pub homework: DocumentId,
}

/// Collection holding every course.
pub fn courses_collection() -> CollectionPath {
    CollectionPath::root(collections::COURSES)
}

impl CourseKey {
    /// Build a key.
    pub const fn new(course: DocumentId) -> Self {
        Self { course }
    }

    /// Path of the course document.
    pub fn document_path(&self) -> DocumentPath {
        courses_collection().doc(self.course.clone())
    }

    /// Collection of the course's chapters.
    pub fn chapters(&self) -> CollectionPath {
        self.document_path().child(collections::CHAPTERS)
    }

    /// Key of a chapter in this course.
    pub fn chapter(&self, chapter: DocumentId) -> ChapterKey {
        ChapterKey::new(self.course.clone(), chapter)
    }
}

impl ChapterKey {
    /// Build a key.
    pub const fn new(course: DocumentId, chapter: DocumentId) -> Self {
        Self { course, chapter }
    }

    /// Key of the owning course.
    pub fn course_key(&self) -> CourseKey {
        CourseKey::new(self.course.clone())
    }

    /// Path of the chapter document.
    pub fn document_path(&self) -> DocumentPath {
        self.course_key().chapters().doc(self.chapter.clone())
    }

    /// Collection of the chapter's lessons.
    pub fn lessons(&self) -> CollectionPath {
        self.document_path().child(collections::LESSONS)
    }

    /// Key of a lesson in this chapter.
    pub fn lesson(&self, lesson: DocumentId) -> LessonKey {
        LessonKey::new(self.course.clone(), self.chapter.clone(), lesson)
    }
}

impl LessonKey {
    /// Build a key.
    pub const fn new(course: DocumentId, chapter: DocumentId, lesson: DocumentId) -> Self {
        Self {
            course,
            chapter,
            lesson,
        }
    }

    /// Key of the owning chapter.
    pub fn chapter_key(&self) -> ChapterKey {
        ChapterKey::new(self.course.clone(), self.chapter.clone())
    }

    /// Path of the lesson document.
    pub fn document_path(&self) -> DocumentPath {
        self.chapter_key().lessons().doc(self.lesson.clone())
    }

    /// Collection of the lesson's homeworks.
    pub fn homeworks(&self) -> CollectionPath {
        self.document_path().child(collections::HOMEWORKS)
    }

    /// Key of a homework in this lesson.
    pub fn homework(&self, homework: DocumentId) -> HomeworkKey {
        HomeworkKey::new(
            self.course.clone(),
            self.chapter.clone(),
            self.lesson.clone(),
            homework,
        )
    }
}

impl HomeworkKey {
    /// Build a key.
    pub const fn new(
        course: DocumentId,
        chapter: DocumentId,
        lesson: DocumentId,
        homework: DocumentId,
    ) -> Self {
        Self {
            course,
            chapter,
            lesson,
            homework,
        }
    }

    /// Key of the owning lesson.
    pub fn lesson_key(&self) -> LessonKey {
        LessonKey::new(self.course.clone(), self.chapter.clone(), self.lesson.clone())
    }

    /// Path of the homework document.
    pub fn document_path(&self) -> DocumentPath {
        self.lesson_key().homeworks().doc(self.homework.clone())
    }
}

/// A course or chapter: named, ordered node of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Ordinal within the sibling group.
    pub order: i64,
    /// Fields not modelled above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl Section {
    /// Decode a stored document.
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            name: read::string(&document.fields, fields::NAME),
            order: read::integer(&document.fields, fields::ORDER),
            extra: read::extra(&document.fields, &[fields::NAME, fields::ORDER]),
        }
    }
}

/// A course.
pub type Course = Section;
/// A chapter.
pub type Chapter = Section;

/// A lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Ordinal within the chapter.
    pub order: i64,
    /// Free-text description.
    pub description: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl Lesson {
    /// Decode a stored document.
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            name: read::string(&document.fields, fields::NAME),
            order: read::integer(&document.fields, fields::ORDER),
            description: read::string(&document.fields, fields::DESCRIPTION),
            extra: read::extra(
                &document.fields,
                &[fields::NAME, fields::ORDER, fields::DESCRIPTION],
            ),
        }
    }
}

/// A homework assignment with its attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Assignment text.
    pub text: String,
    /// Attached files.
    pub files: Vec<FileRef>,
    /// Fields not modelled above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl Homework {
    /// Decode a stored document. Malformed attachments are skipped.
    pub fn from_document(document: &Document) -> Self {
        let files = match document.fields.get(fields::FILES) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value::<FileRef>(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            id: document.id.clone(),
            text: read::string(&document.fields, fields::TEXT),
            files,
            extra: read::extra(&document.fields, &[fields::TEXT, fields::FILES]),
        }
    }
}

/// New course or chapter. Unknown fields are stored as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionDraft {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Ordinal within the sibling group.
    #[serde(default)]
    pub order: i64,
    /// Additional fields.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl SectionDraft {
    /// Field map to store.
    pub fn into_fields(self) -> FieldMap {
        let mut stored = self.extra;
        stored.insert(fields::NAME.to_owned(), json!(self.name));
        stored.insert(fields::ORDER.to_owned(), json!(self.order));
        stored
    }
}

/// New lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Ordinal within the chapter.
    #[serde(default)]
    pub order: i64,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Additional fields.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl LessonDraft {
    /// Field map to store.
    pub fn into_fields(self) -> FieldMap {
        let mut stored = self.extra;
        stored.insert(fields::NAME.to_owned(), json!(self.name));
        stored.insert(fields::ORDER.to_owned(), json!(self.order));
        stored.insert(fields::DESCRIPTION.to_owned(), json!(self.description));
        stored
    }
}

/// New homework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkDraft {
    /// Assignment text.
    #[serde(default)]
    pub text: String,
    /// Attachments already uploaded.
    #[serde(default)]
    pub files: Vec<FileRef>,
    /// Additional fields.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: FieldMap,
}

impl HomeworkDraft {
    /// Field map to store.
    pub fn into_fields(self) -> FieldMap {
        let mut stored = self.extra;
        stored.insert(fields::TEXT.to_owned(), json!(self.text));
        stored.insert(fields::FILES.to_owned(), json!(self.files));
        stored
    }
}

/// Partial update of any library node: the listed fields overwrite the
/// stored ones, everything else is left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct LibraryPatch(pub FieldMap);

impl LibraryPatch {
    /// Field updates to merge. The identifier is never written as a field.
    pub fn into_updates(self) -> Vec<FieldUpdate> {
        let mut patch = self.0;
        patch.remove("id");
        super::updates_from_fields(patch)
    }
}

/// Name-only reference used by the soft join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LibraryRef {
    /// Document identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Display name.
    pub name: String,
}

/// Chapter with its lessons.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChapterNode {
    /// The chapter.
    #[serde(flatten)]
    pub chapter: Section,
    /// Lessons, in listing order.
    pub lessons: Vec<Lesson>,
}

/// Course with its chapters.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CourseNode {
    /// The course.
    #[serde(flatten)]
    pub course: Section,
    /// Chapters, in listing order.
    pub chapters: Vec<ChapterNode>,
}

/// Point-in-time copy of the course tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct LibrarySnapshot {
    /// Courses, in listing order.
    pub courses: Vec<CourseNode>,
}

/// Result of resolving foreign keys against a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedRefs {
    /// Course, when it still exists.
    pub course: Option<LibraryRef>,
    /// Chapter, when it still exists under the course.
    pub chapter: Option<LibraryRef>,
    /// Lesson, when it still exists under the chapter.
    pub lesson: Option<LibraryRef>,
}

impl LibrarySnapshot {
    /// Resolve course/chapter/lesson identifiers. Identifiers that no longer
    /// match anything resolve to `None`; resolution never fails.
    ///
    /// # Examples
    /// ```
    /// use classdesk::domain::LibrarySnapshot;
    ///
    /// let refs = LibrarySnapshot::default().resolve(Some("gone"), None, None);
    /// assert!(refs.course.is_none());
    /// ```
    pub fn resolve(
        &self,
        course_id: Option<&str>,
        chapter_id: Option<&str>,
        lesson_id: Option<&str>,
    ) -> ResolvedRefs {
        let course = course_id.and_then(|id| {
            self.courses
                .iter()
                .find(|node| node.course.id.as_str() == id)
        });
        let chapter = course.zip(chapter_id).and_then(|(node, id)| {
            node.chapters
                .iter()
                .find(|chapter| chapter.chapter.id.as_str() == id)
        });
        let lesson = chapter
            .zip(lesson_id)
            .and_then(|(node, id)| node.lessons.iter().find(|lesson| lesson.id.as_str() == id));

        ResolvedRefs {
            course: course.map(|node| LibraryRef {
                id: node.course.id.clone(),
                name: node.course.name.clone(),
            }),
            chapter: chapter.map(|node| LibraryRef {
                id: node.chapter.id.clone(),
                name: node.chapter.name.clone(),
            }),
            lesson: lesson.map(|found| LibraryRef {
                id: found.id.clone(),
                name: found.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Key paths, lenient decoding and the soft join.

    use rstest::{fixture, rstest};

    use super::*;

    fn id(raw: &str) -> DocumentId {
        DocumentId::new(raw).expect("valid id")
    }

    fn section(raw_id: &str, name: &str) -> Section {
        Section {
            id: id(raw_id),
            name: name.to_owned(),
            order: 0,
            extra: FieldMap::new(),
        }
    }

    #[fixture]
    fn snapshot() -> LibrarySnapshot {
        LibrarySnapshot {
            courses: vec![CourseNode {
                course: section("c1", "Algebra"),
                chapters: vec![ChapterNode {
                    chapter: section("ch1", "Equations"),
                    lessons: vec![Lesson {
                        id: id("l1"),
                        name: "Linear".to_owned(),
                        order: 1,
                        description: String::new(),
                        extra: FieldMap::new(),
                    }],
                }],
            }],
        }
    }

    #[rstest]
    fn keys_render_nested_paths() {
        let key = HomeworkKey::new(id("c"), id("ch"), id("l"), id("h"));
        assert_eq!(
            key.document_path().to_string(),
            "courses/c/chapters/ch/lessons/l/homeworks/h"
        );
        assert_eq!(
            key.lesson_key().chapter_key().lessons().to_string(),
            "courses/c/chapters/ch/lessons"
        );
    }

    #[rstest]
    fn section_decoding_tolerates_bad_fields() {
        let document = Document::new(
            id("c1"),
            json!({ "name": 7, "order": "3", "colour": "red" })
                .as_object()
                .cloned()
                .expect("object"),
        );
        let decoded = Section::from_document(&document);
        assert_eq!(decoded.name, "7");
        assert_eq!(decoded.order, 3);
        assert_eq!(decoded.extra.get("colour"), Some(&json!("red")));
    }

    #[rstest]
    fn homework_skips_malformed_attachments() {
        let document = Document::new(
            id("h1"),
            json!({
                "text": "Read chapter 2",
                "files": [{ "url": "http://x/a.pdf", "name": "a.pdf" }, { "name": "no url" }]
            })
            .as_object()
            .cloned()
            .expect("object"),
        );
        let decoded = Homework::from_document(&document);
        assert_eq!(decoded.files.len(), 1);
    }

    #[rstest]
    fn patch_never_writes_identifier() {
        let patch = LibraryPatch(
            json!({ "id": "other", "name": "Renamed" })
                .as_object()
                .cloned()
                .expect("object"),
        );
        assert_eq!(
            patch.into_updates(),
            vec![FieldUpdate::set("name", json!("Renamed"))]
        );
    }

    #[rstest]
    fn resolve_finds_every_level(snapshot: LibrarySnapshot) {
        let refs = snapshot.resolve(Some("c1"), Some("ch1"), Some("l1"));
        assert_eq!(refs.course.map(|r| r.name), Some("Algebra".to_owned()));
        assert_eq!(refs.chapter.map(|r| r.name), Some("Equations".to_owned()));
        assert_eq!(refs.lesson.map(|r| r.name), Some("Linear".to_owned()));
    }

    #[rstest]
    #[case(Some("missing"), Some("ch1"), Some("l1"))]
    #[case(None, Some("ch1"), Some("l1"))]
    fn resolve_is_soft_when_course_is_gone(
        snapshot: LibrarySnapshot,
        #[case] course: Option<&str>,
        #[case] chapter: Option<&str>,
        #[case] lesson: Option<&str>,
    ) {
        assert_eq!(snapshot.resolve(course, chapter, lesson), ResolvedRefs::default());
    }

    #[rstest]
    fn resolve_keeps_course_when_lesson_is_gone(snapshot: LibrarySnapshot) {
        let refs = snapshot.resolve(Some("c1"), Some("ch1"), Some("deleted"));
        assert!(refs.course.is_some());
        assert!(refs.chapter.is_some());
        assert!(refs.lesson.is_none());
    }
}
