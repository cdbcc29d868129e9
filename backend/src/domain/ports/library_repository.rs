//! Driving port for the course library and its file attachments.
//!
//! Every level of the hierarchy exposes the same four operations: list the
//! children of a parent, create a child, merge a partial update into a
//! child, delete a child.

use async_trait::async_trait;
use url::Url;

use crate::domain::{
    BlobPath, ChapterKey, Course, CourseKey, DocumentId, Error, FileName, FileRef, FileUpload,
    Homework, HomeworkDraft, HomeworkKey, Lesson, LessonDraft, LessonKey, LibraryPatch,
    LibrarySnapshot, Section, SectionDraft,
};

use super::StoredBlob;

/// Driving port for library reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    /// List courses ordered by ordinal, name, then id.
    async fn list_courses(&self) -> Result<Vec<Course>, Error>;

    /// Create a course and return its generated id.
    async fn create_course(&self, draft: SectionDraft) -> Result<DocumentId, Error>;

    /// Merge fields into a course.
    async fn update_course(&self, key: &CourseKey, patch: LibraryPatch) -> Result<(), Error>;

    /// Delete a course and, best effort, its descendants.
    async fn delete_course(&self, key: &CourseKey) -> Result<(), Error>;

    /// List chapters of a course.
    async fn list_chapters(&self, course: &CourseKey) -> Result<Vec<Section>, Error>;

    /// Create a chapter in a course.
    async fn create_chapter(
        &self,
        course: &CourseKey,
        draft: SectionDraft,
    ) -> Result<DocumentId, Error>;

    /// Merge fields into a chapter.
    async fn update_chapter(&self, key: &ChapterKey, patch: LibraryPatch) -> Result<(), Error>;

    /// Delete a chapter and, best effort, its descendants.
    async fn delete_chapter(&self, key: &ChapterKey) -> Result<(), Error>;

    /// List lessons of a chapter.
    async fn list_lessons(&self, chapter: &ChapterKey) -> Result<Vec<Lesson>, Error>;

    /// Create a lesson in a chapter.
    async fn create_lesson(
        &self,
        chapter: &ChapterKey,
        draft: LessonDraft,
    ) -> Result<DocumentId, Error>;

    /// Merge fields into a lesson.
    async fn update_lesson(&self, key: &LessonKey, patch: LibraryPatch) -> Result<(), Error>;

    /// Delete a lesson and, best effort, its homeworks.
    async fn delete_lesson(&self, key: &LessonKey) -> Result<(), Error>;

    /// List homeworks of a lesson.
    async fn list_homeworks(&self, lesson: &LessonKey) -> Result<Vec<Homework>, Error>;

    /// Create a homework in a lesson.
    async fn create_homework(
        &self,
        lesson: &LessonKey,
        draft: HomeworkDraft,
    ) -> Result<DocumentId, Error>;

    /// Merge fields into a homework.
    async fn update_homework(&self, key: &HomeworkKey, patch: LibraryPatch) -> Result<(), Error>;

    /// Delete a homework. Its stored files are left in place.
    async fn delete_homework(&self, key: &HomeworkKey) -> Result<(), Error>;

    /// Store a file under the homework's blob prefix.
    async fn upload_homework_file(
        &self,
        key: &HomeworkKey,
        name: FileName,
        upload: FileUpload,
    ) -> Result<FileRef, Error>;

    /// URL of a file previously stored for the homework.
    async fn homework_file_url(&self, key: &HomeworkKey, name: &FileName) -> Result<Url, Error>;

    /// Remove a file stored for the homework.
    async fn delete_homework_file(&self, key: &HomeworkKey, name: &FileName)
    -> Result<(), Error>;

    /// Store a file under `files/`.
    async fn upload_loose_file(&self, name: FileName, upload: FileUpload)
    -> Result<FileRef, Error>;

    /// URL of a file stored under `files/`.
    async fn loose_file_url(&self, name: &FileName) -> Result<Url, Error>;

    /// Remove a file stored under `files/`.
    async fn delete_loose_file(&self, name: &FileName) -> Result<(), Error>;

    /// Read stored bytes for a blob URL path.
    async fn read_file(&self, path: &BlobPath) -> Result<StoredBlob, Error>;

    /// Read the course → chapter → lesson tree.
    async fn snapshot(&self) -> Result<LibrarySnapshot, Error>;
}
