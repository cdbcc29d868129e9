//! Recommendation tabs service implementing [`TeacherRecommendations`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::domain::ports::{DocumentStore, TeacherRecommendations, WriteBatch};
use crate::domain::service_support::{list_documents, map_store_error};
use crate::domain::{DocumentId, Error, RecommendationTab, tabs_collection};

/// Recommendation tabs over a document store.
pub struct RecommendationsService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> RecommendationsService<S> {
    /// Create the service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> TeacherRecommendations for RecommendationsService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list_tabs(&self, student_id: &DocumentId) -> Result<Vec<RecommendationTab>, Error> {
        let mut tabs: Vec<RecommendationTab> =
            list_documents(&*self.store, tabs_collection(student_id))
                .await?
                .iter()
                .map(RecommendationTab::from_document)
                .collect();
        tabs.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(tabs)
    }

    async fn save_tabs(
        &self,
        student_id: &DocumentId,
        tabs: Vec<RecommendationTab>,
    ) -> Result<(), Error> {
        if tabs.is_empty() {
            return Ok(());
        }
        let collection = tabs_collection(student_id);
        let mut batch = WriteBatch::new();
        for tab in &tabs {
            batch.set(collection.doc(tab.id.clone()), tab.to_fields());
        }
        self.store.commit(batch).await.map_err(|err| {
            error!(student = %student_id, error = %err, "recommendation batch failed");
            map_store_error(err)
        })
    }

    async fn delete_tab(&self, student_id: &DocumentId, tab_id: &DocumentId) -> Result<(), Error> {
        self.store
            .delete(&tabs_collection(student_id).doc(tab_id.clone()))
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{BatchWrite, DocumentStoreError, MockDocumentStore};
    use crate::domain::{ErrorCode, RecommendationItem};

    fn tab(raw: &str) -> RecommendationTab {
        RecommendationTab {
            id: DocumentId::new(raw).expect("id"),
            label: raw.to_uppercase(),
            icon: "star".to_owned(),
            items: vec![RecommendationItem::default()],
        }
    }

    fn student() -> DocumentId {
        DocumentId::new("s1").expect("id")
    }

    #[rstest]
    #[tokio::test]
    async fn save_commits_every_tab_in_one_batch() {
        let mut store = MockDocumentStore::new();
        store
            .expect_commit()
            .withf(|batch| {
                batch.writes().len() == 2
                    && batch
                        .writes()
                        .iter()
                        .all(|write| matches!(write, BatchWrite::Set { .. }))
            })
            .times(1)
            .return_once(|_| Ok(()));
        RecommendationsService::new(Arc::new(store))
            .save_tabs(&student(), vec![tab("reading"), tab("maths")])
            .await
            .expect("saved");
    }

    #[rstest]
    #[tokio::test]
    async fn failed_batch_surfaces_server_error() {
        let mut store = MockDocumentStore::new();
        store
            .expect_commit()
            .return_once(|_| Err(DocumentStoreError::query("aborted")));
        let err = RecommendationsService::new(Arc::new(store))
            .save_tabs(&student(), vec![tab("reading")])
            .await
            .expect_err("batch failed");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_save_skips_the_store() {
        RecommendationsService::new(Arc::new(MockDocumentStore::new()))
            .save_tabs(&student(), Vec::new())
            .await
            .expect("nothing to save");
    }
}
