//! Driving port for student profiles.

use async_trait::async_trait;

use crate::domain::{DocumentId, Error, LibraryPatch, Student, StudentDraft};

/// Driving port for reading and editing student profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// List every student ordered by name, then id.
    async fn list_students(&self) -> Result<Vec<Student>, Error>;

    /// Read one student.
    async fn get_student(&self, id: &DocumentId) -> Result<Student, Error>;

    /// Create a student and return the generated id.
    async fn create_student(&self, draft: StudentDraft) -> Result<DocumentId, Error>;

    /// Merge profile fields. Push settings cannot be changed this way.
    async fn update_student(&self, id: &DocumentId, patch: LibraryPatch) -> Result<(), Error>;

    /// Store a push token and enable notifications.
    async fn register_push_token(&self, id: &DocumentId, token: String) -> Result<(), Error>;

    /// Remove the push token and disable notifications.
    async fn clear_push_token(&self, id: &DocumentId) -> Result<(), Error>;
}
