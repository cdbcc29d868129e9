//! Internal helpers shared by the domain services.

use crate::domain::ports::{BlobStoreError, DocumentQuery, DocumentStore, DocumentStoreError};
use crate::domain::{
    ChapterNode, CollectionPath, CourseNode, Document, DocumentId, DocumentPath, Error, Lesson,
    LibrarySnapshot, Section, collections, courses_collection,
};

pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Connection { message } => {
            Error::service_unavailable(format!("document store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            Error::internal(format!("document store error: {message}"))
        }
        DocumentStoreError::NotFound { path } => Error::not_found(format!("{path} not found")),
    }
}

pub(crate) fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("blob store unavailable: {message}"))
        }
        BlobStoreError::Storage { message } => {
            Error::internal(format!("blob store error: {message}"))
        }
        BlobStoreError::NotFound { path } => Error::not_found(format!("file {path} not found")),
    }
}

pub(crate) async fn list_documents<S>(
    store: &S,
    collection: CollectionPath,
) -> Result<Vec<Document>, Error>
where
    S: DocumentStore + ?Sized,
{
    store
        .query(&DocumentQuery::collection(collection))
        .await
        .map_err(map_store_error)
}

pub(crate) async fn list_sections<S>(
    store: &S,
    collection: CollectionPath,
) -> Result<Vec<Section>, Error>
where
    S: DocumentStore + ?Sized,
{
    let mut sections: Vec<Section> = list_documents(store, collection)
        .await?
        .iter()
        .map(Section::from_document)
        .collect();
    sections.sort_by(|left, right| {
        (left.order, &left.name, &left.id).cmp(&(right.order, &right.name, &right.id))
    });
    Ok(sections)
}

pub(crate) async fn list_lessons<S>(
    store: &S,
    collection: CollectionPath,
) -> Result<Vec<Lesson>, Error>
where
    S: DocumentStore + ?Sized,
{
    let mut lessons: Vec<Lesson> = list_documents(store, collection)
        .await?
        .iter()
        .map(Lesson::from_document)
        .collect();
    lessons.sort_by(|left, right| {
        (left.order, &left.name, &left.id).cmp(&(right.order, &right.name, &right.id))
    });
    Ok(lessons)
}

/// Read the course tree level by level.
pub(crate) async fn load_snapshot<S>(store: &S) -> Result<LibrarySnapshot, Error>
where
    S: DocumentStore + ?Sized,
{
    let mut courses = Vec::new();
    for course in list_sections(store, courses_collection()).await? {
        let course_path = courses_collection().doc(course.id.clone());
        let mut chapters = Vec::new();
        for chapter in list_sections(store, course_path.child(collections::CHAPTERS)).await? {
            let lessons = list_lessons(
                store,
                chapter_path(&course_path, &chapter.id).child(collections::LESSONS),
            )
            .await?;
            chapters.push(ChapterNode { chapter, lessons });
        }
        courses.push(CourseNode { course, chapters });
    }
    Ok(LibrarySnapshot { courses })
}

fn chapter_path(course: &DocumentPath, chapter: &DocumentId) -> DocumentPath {
    course.child(collections::CHAPTERS).doc(chapter.clone())
}

/// Fetch a document or fail with not-found.
pub(crate) async fn require_document<S>(store: &S, path: &DocumentPath) -> Result<Document, Error>
where
    S: DocumentStore + ?Sized,
{
    store
        .get(path)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::not_found(format!("{path} not found")))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(DocumentStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(DocumentStoreError::query("syntax"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::not_found("courses/c1"), ErrorCode::NotFound)]
    fn store_errors_map_to_codes(#[case] error: DocumentStoreError, #[case] code: ErrorCode) {
        assert_eq!(map_store_error(error).code(), code);
    }

    #[rstest]
    #[case(BlobStoreError::unavailable("disk"), ErrorCode::ServiceUnavailable)]
    #[case(BlobStoreError::storage("io"), ErrorCode::InternalError)]
    #[case(BlobStoreError::not_found("files/a"), ErrorCode::NotFound)]
    fn blob_errors_map_to_codes(#[case] error: BlobStoreError, #[case] code: ErrorCode) {
        assert_eq!(map_blob_error(error).code(), code);
    }
}
