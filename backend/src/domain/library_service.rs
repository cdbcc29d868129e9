//! Library service implementing the [`LibraryRepository`] driving port.
//!
//! Deletes cascade to descendant documents one by one. A failure while
//! removing a descendant is logged and skipped so the requested node is
//! still removed; orphans left behind are unreachable through the API.
//! Stored files are never removed by a cascade.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use url::Url;

use crate::domain::ports::{BlobStore, DocumentStore, LibraryRepository, StoredBlob};
use crate::domain::service_support::{
    list_documents, list_lessons, list_sections, load_snapshot, map_blob_error, map_store_error,
};
use crate::domain::{
    BlobPath, ChapterKey, CollectionPath, CourseKey, DocumentId, DocumentPath, Error, FileName,
    FileRef, FileUpload, Homework, HomeworkDraft, HomeworkKey, Lesson, LessonDraft, LessonKey,
    LibraryPatch, LibrarySnapshot, Section, SectionDraft, courses_collection,
};

/// Library service over a document store and a blob store.
pub struct LibraryService<S: ?Sized, B: ?Sized> {
    store: Arc<S>,
    blobs: Arc<B>,
}

impl<S: ?Sized, B: ?Sized> LibraryService<S, B> {
    /// Create the service.
    pub fn new(store: Arc<S>, blobs: Arc<B>) -> Self {
        Self { store, blobs }
    }
}

impl<S, B> LibraryService<S, B>
where
    S: DocumentStore + ?Sized,
    B: BlobStore + ?Sized,
{
    async fn merge(&self, path: &DocumentPath, patch: LibraryPatch) -> Result<(), Error> {
        self.store
            .update(path, &patch.into_updates())
            .await
            .map_err(map_store_error)
    }

    async fn remove(&self, path: &DocumentPath) -> Result<(), Error> {
        self.store.delete(path).await.map_err(map_store_error)
    }

    /// Delete without propagating failures; used for descendants.
    async fn remove_descendant(&self, path: &DocumentPath) {
        if let Err(error) = self.store.delete(path).await {
            warn!(%path, %error, "failed to delete descendant document");
        }
    }

    async fn child_ids(&self, collection: CollectionPath) -> Vec<DocumentId> {
        let parent = collection.to_string();
        match list_documents(&*self.store, collection).await {
            Ok(documents) => documents.into_iter().map(|document| document.id).collect(),
            Err(error) => {
                warn!(collection = %parent, %error, "failed to list descendants for cascade");
                Vec::new()
            }
        }
    }

    async fn cascade_lesson(&self, key: &LessonKey) {
        for homework in self.child_ids(key.homeworks()).await {
            self.remove_descendant(&key.homework(homework).document_path())
                .await;
        }
    }

    async fn cascade_chapter(&self, key: &ChapterKey) {
        for lesson in self.child_ids(key.lessons()).await {
            let lesson_key = key.lesson(lesson);
            self.cascade_lesson(&lesson_key).await;
            self.remove_descendant(&lesson_key.document_path()).await;
        }
    }

    async fn cascade_course(&self, key: &CourseKey) {
        for chapter in self.child_ids(key.chapters()).await {
            let chapter_key = key.chapter(chapter);
            self.cascade_chapter(&chapter_key).await;
            self.remove_descendant(&chapter_key.document_path()).await;
        }
    }

    async fn store_file(
        &self,
        path: BlobPath,
        name: FileName,
        upload: FileUpload,
    ) -> Result<FileRef, Error> {
        let url = self.blobs.put(&path, upload).await.map_err(map_blob_error)?;
        Ok(FileRef {
            url,
            name: name.into(),
        })
    }
}

#[async_trait]
impl<S, B> LibraryRepository for LibraryService<S, B>
where
    S: DocumentStore + ?Sized,
    B: BlobStore + ?Sized,
{
    async fn list_courses(&self) -> Result<Vec<Section>, Error> {
        list_sections(&*self.store, courses_collection()).await
    }

    async fn create_course(&self, draft: SectionDraft) -> Result<DocumentId, Error> {
        self.store
            .create(&courses_collection(), draft.into_fields())
            .await
            .map_err(map_store_error)
    }

    async fn update_course(&self, key: &CourseKey, patch: LibraryPatch) -> Result<(), Error> {
        self.merge(&key.document_path(), patch).await
    }

    async fn delete_course(&self, key: &CourseKey) -> Result<(), Error> {
        self.cascade_course(key).await;
        self.remove(&key.document_path()).await
    }

    async fn list_chapters(&self, course: &CourseKey) -> Result<Vec<Section>, Error> {
        list_sections(&*self.store, course.chapters()).await
    }

    async fn create_chapter(
        &self,
        course: &CourseKey,
        draft: SectionDraft,
    ) -> Result<DocumentId, Error> {
        self.store
            .create(&course.chapters(), draft.into_fields())
            .await
            .map_err(map_store_error)
    }

    async fn update_chapter(&self, key: &ChapterKey, patch: LibraryPatch) -> Result<(), Error> {
        self.merge(&key.document_path(), patch).await
    }

    async fn delete_chapter(&self, key: &ChapterKey) -> Result<(), Error> {
        self.cascade_chapter(key).await;
        self.remove(&key.document_path()).await
    }

    async fn list_lessons(&self, chapter: &ChapterKey) -> Result<Vec<Lesson>, Error> {
        list_lessons(&*self.store, chapter.lessons()).await
    }

    async fn create_lesson(
        &self,
        chapter: &ChapterKey,
        draft: LessonDraft,
    ) -> Result<DocumentId, Error> {
        self.store
            .create(&chapter.lessons(), draft.into_fields())
            .await
            .map_err(map_store_error)
    }

    async fn update_lesson(&self, key: &LessonKey, patch: LibraryPatch) -> Result<(), Error> {
        self.merge(&key.document_path(), patch).await
    }

    async fn delete_lesson(&self, key: &LessonKey) -> Result<(), Error> {
        self.cascade_lesson(key).await;
        self.remove(&key.document_path()).await
    }

    async fn list_homeworks(&self, lesson: &LessonKey) -> Result<Vec<Homework>, Error> {
        let mut homeworks: Vec<Homework> = list_documents(&*self.store, lesson.homeworks())
            .await?
            .iter()
            .map(Homework::from_document)
            .collect();
        homeworks.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(homeworks)
    }

    async fn create_homework(
        &self,
        lesson: &LessonKey,
        draft: HomeworkDraft,
    ) -> Result<DocumentId, Error> {
        self.store
            .create(&lesson.homeworks(), draft.into_fields())
            .await
            .map_err(map_store_error)
    }

    async fn update_homework(&self, key: &HomeworkKey, patch: LibraryPatch) -> Result<(), Error> {
        self.merge(&key.document_path(), patch).await
    }

    async fn delete_homework(&self, key: &HomeworkKey) -> Result<(), Error> {
        self.remove(&key.document_path()).await
    }

    async fn upload_homework_file(
        &self,
        key: &HomeworkKey,
        name: FileName,
        upload: FileUpload,
    ) -> Result<FileRef, Error> {
        self.store_file(BlobPath::homework_file(key, &name), name, upload)
            .await
    }

    async fn homework_file_url(&self, key: &HomeworkKey, name: &FileName) -> Result<Url, Error> {
        self.blobs
            .url(&BlobPath::homework_file(key, name))
            .await
            .map_err(map_blob_error)
    }

    async fn delete_homework_file(
        &self,
        key: &HomeworkKey,
        name: &FileName,
    ) -> Result<(), Error> {
        self.blobs
            .delete(&BlobPath::homework_file(key, name))
            .await
            .map_err(map_blob_error)
    }

    async fn upload_loose_file(
        &self,
        name: FileName,
        upload: FileUpload,
    ) -> Result<FileRef, Error> {
        self.store_file(BlobPath::loose_file(&name), name, upload)
            .await
    }

    async fn loose_file_url(&self, name: &FileName) -> Result<Url, Error> {
        self.blobs
            .url(&BlobPath::loose_file(name))
            .await
            .map_err(map_blob_error)
    }

    async fn delete_loose_file(&self, name: &FileName) -> Result<(), Error> {
        self.blobs
            .delete(&BlobPath::loose_file(name))
            .await
            .map_err(map_blob_error)
    }

    async fn read_file(&self, path: &BlobPath) -> Result<StoredBlob, Error> {
        self.blobs
            .get(path)
            .await
            .map_err(map_blob_error)?
            .ok_or_else(|| Error::not_found(format!("file {path} not found")))
    }

    async fn snapshot(&self) -> Result<LibrarySnapshot, Error> {
        load_snapshot(&*self.store).await
    }
}
