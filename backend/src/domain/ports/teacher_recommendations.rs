//! Driving port for teacher recommendation tabs.

use async_trait::async_trait;

use crate::domain::{DocumentId, Error, RecommendationTab};

/// Driving port for per-student recommendation tabs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeacherRecommendations: Send + Sync {
    /// Tabs for a student ordered by id.
    async fn list_tabs(&self, student_id: &DocumentId) -> Result<Vec<RecommendationTab>, Error>;

    /// Write every tab in one batch. Either all tabs are stored or none are.
    async fn save_tabs(
        &self,
        student_id: &DocumentId,
        tabs: Vec<RecommendationTab>,
    ) -> Result<(), Error>;

    /// Delete one tab.
    async fn delete_tab(&self, student_id: &DocumentId, tab_id: &DocumentId)
    -> Result<(), Error>;
}
