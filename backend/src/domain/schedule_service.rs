//! Weekly schedule service implementing the [`WeeklySchedule`] port.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{DocumentQuery, DocumentStore, WeeklySchedule};
use crate::domain::service_support::map_store_error;
use crate::domain::{
    DocumentId, Error, LibraryPatch, ScheduleDraft, ScheduleEntry, schedule_collection,
    schedule_fields, sort_week,
};

/// Weekly schedule over a document store.
pub struct ScheduleService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> ScheduleService<S> {
    /// Create the service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> WeeklySchedule for ScheduleService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list_entries(&self, student_id: &DocumentId) -> Result<Vec<ScheduleEntry>, Error> {
        let query = DocumentQuery::collection(schedule_collection())
            .where_eq(schedule_fields::STUDENT_ID, json!(student_id.as_str()));
        let mut entries: Vec<ScheduleEntry> = self
            .store
            .query(&query)
            .await
            .map_err(map_store_error)?
            .iter()
            .map(ScheduleEntry::from_document)
            .collect();
        sort_week(&mut entries);
        Ok(entries)
    }

    async fn add_entry(
        &self,
        student_id: &DocumentId,
        draft: ScheduleDraft,
    ) -> Result<DocumentId, Error> {
        self.store
            .create(&schedule_collection(), draft.into_fields(student_id))
            .await
            .map_err(map_store_error)
    }

    async fn update_entry(
        &self,
        entry_id: &DocumentId,
        patch: LibraryPatch,
    ) -> Result<(), Error> {
        self.store
            .update(&schedule_collection().doc(entry_id.clone()), &patch.into_updates())
            .await
            .map_err(map_store_error)
    }

    async fn delete_entry(&self, entry_id: &DocumentId) -> Result<(), Error> {
        self.store
            .delete(&schedule_collection().doc(entry_id.clone()))
            .await
            .map_err(map_store_error)
    }
}
