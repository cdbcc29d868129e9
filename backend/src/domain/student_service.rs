//! Student directory service implementing the [`StudentDirectory`] port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{DocumentStore, StudentDirectory};
use crate::domain::service_support::{list_documents, map_store_error, require_document};
use crate::domain::{
    DocumentId, Error, LibraryPatch, Student, StudentDraft, clear_token_updates,
    register_token_updates, student_fields, students_collection,
};

/// Student directory over a document store.
pub struct StudentService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> StudentService<S> {
    /// Create the service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> StudentDirectory for StudentService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list_students(&self) -> Result<Vec<Student>, Error> {
        let mut students: Vec<Student> = list_documents(&*self.store, students_collection())
            .await?
            .iter()
            .map(Student::from_document)
            .collect();
        students.sort_by(|left, right| (&left.name, &left.id).cmp(&(&right.name, &right.id)));
        Ok(students)
    }

    async fn get_student(&self, id: &DocumentId) -> Result<Student, Error> {
        let document =
            require_document(&*self.store, &students_collection().doc(id.clone())).await?;
        Ok(Student::from_document(&document))
    }

    async fn create_student(&self, draft: StudentDraft) -> Result<DocumentId, Error> {
        self.store
            .create(&students_collection(), draft.into_fields())
            .await
            .map_err(map_store_error)
    }

    async fn update_student(&self, id: &DocumentId, patch: LibraryPatch) -> Result<(), Error> {
        if patch.0.contains_key(student_fields::FCM_TOKEN)
            || patch.0.contains_key(student_fields::PUSH_ENABLED)
        {
            return Err(Error::invalid_request(
                "push settings change through the push-token endpoints",
            ));
        }
        self.store
            .update(&students_collection().doc(id.clone()), &patch.into_updates())
            .await
            .map_err(map_store_error)
    }

    async fn register_push_token(&self, id: &DocumentId, token: String) -> Result<(), Error> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_request("fcmToken must not be empty"));
        }
        self.store
            .update(
                &students_collection().doc(id.clone()),
                &register_token_updates(trimmed),
            )
            .await
            .map_err(map_store_error)
    }

    async fn clear_push_token(&self, id: &DocumentId) -> Result<(), Error> {
        self.store
            .update(&students_collection().doc(id.clone()), &clear_token_updates())
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{DocumentStoreError, MockDocumentStore};
    use crate::domain::{Document, ErrorCode, FieldMap, FieldUpdate};

    fn id(raw: &str) -> DocumentId {
        DocumentId::new(raw).expect("valid id")
    }

    #[rstest]
    #[tokio::test]
    async fn missing_student_is_not_found() {
        let mut store = MockDocumentStore::new();
        store.expect_get().return_once(|_| Ok(None));
        let err = StudentService::new(Arc::new(store))
            .get_student(&id("ghost"))
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn list_sorts_by_name() {
        let mut store = MockDocumentStore::new();
        store.expect_query().return_once(|_| {
            Ok(vec![
                Document::new(id("2"), json!({ "name": "Zed" }).as_object().cloned().expect("object")),
                Document::new(id("1"), json!({ "name": "Ada" }).as_object().cloned().expect("object")),
            ])
        });
        let students = StudentService::new(Arc::new(store))
            .list_students()
            .await
            .expect("listed");
        let names: Vec<_> = students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Zed"]);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_updates_cannot_touch_push_settings() {
        let mut patch = FieldMap::new();
        patch.insert("pushNotificationsEnabled".to_owned(), json!(true));
        let err = StudentService::new(Arc::new(MockDocumentStore::new()))
            .update_student(&id("s1"), LibraryPatch(patch))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn register_sets_token_and_enables() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .withf(|_, updates| {
                updates
                    == [
                        FieldUpdate::set("fcmToken", json!("tok")),
                        FieldUpdate::set("pushNotificationsEnabled", json!(true)),
                    ]
            })
            .return_once(|_, _| Ok(()));
        StudentService::new(Arc::new(store))
            .register_push_token(&id("s1"), " tok ".to_owned())
            .await
            .expect("registered");
    }

    #[rstest]
    #[tokio::test]
    async fn clearing_unknown_student_is_not_found() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .return_once(|path, _| Err(DocumentStoreError::not_found(path.to_string())));
        let err = StudentService::new(Arc::new(store))
            .clear_push_token(&id("ghost"))
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
