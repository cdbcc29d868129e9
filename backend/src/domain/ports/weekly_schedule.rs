//! Driving port for weekly schedule entries.

use async_trait::async_trait;

use crate::domain::{DocumentId, Error, LibraryPatch, ScheduleDraft, ScheduleEntry};

/// Driving port for a student's recurring timetable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeeklySchedule: Send + Sync {
    /// Entries for a student, Monday to Sunday then by time.
    async fn list_entries(&self, student_id: &DocumentId) -> Result<Vec<ScheduleEntry>, Error>;

    /// Add an entry for a student.
    async fn add_entry(
        &self,
        student_id: &DocumentId,
        draft: ScheduleDraft,
    ) -> Result<DocumentId, Error>;

    /// Merge fields into an entry.
    async fn update_entry(&self, entry_id: &DocumentId, patch: LibraryPatch)
    -> Result<(), Error>;

    /// Delete an entry.
    async fn delete_entry(&self, entry_id: &DocumentId) -> Result<(), Error>;
}
