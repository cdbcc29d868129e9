//! Driving port for student progress rows.

use async_trait::async_trait;

use crate::domain::{
    DocumentId, Error, FileField, JoinedProgressRow, PercentField, ProgressDraft, ProgressPage,
    ProgressRow,
};

/// Driving port for paginated progress reads and point mutations.
///
/// Mutations overwrite the target field with a value computed from the row
/// as it was read. Two concurrent writers to the same field race and the
/// last one wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressTable: Send + Sync {
    /// Read one page of a student's rows, newest first.
    ///
    /// `limit` defaults to 20 and is clamped to 100.
    async fn fetch_page(
        &self,
        student_id: &DocumentId,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<ProgressPage<ProgressRow>, Error>;

    /// Read one page and join it against the current library.
    async fn fetch_joined_page(
        &self,
        student_id: &DocumentId,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<ProgressPage<JoinedProgressRow>, Error>;

    /// Insert a row stamped with the current time.
    async fn add_row(&self, draft: ProgressDraft) -> Result<DocumentId, Error>;

    /// Delete a row.
    async fn delete_row(&self, row_id: &DocumentId) -> Result<(), Error>;

    /// Append URLs to a file array.
    async fn append_files(
        &self,
        row_id: &DocumentId,
        field: FileField,
        urls: Vec<String>,
    ) -> Result<Vec<String>, Error>;

    /// Remove every occurrence of a URL from a file array.
    async fn remove_file(
        &self,
        row_id: &DocumentId,
        field: FileField,
        url: String,
    ) -> Result<Vec<String>, Error>;

    /// Overwrite a percentage field.
    async fn set_percentage(
        &self,
        row_id: &DocumentId,
        field: PercentField,
        value: f64,
    ) -> Result<(), Error>;
}
