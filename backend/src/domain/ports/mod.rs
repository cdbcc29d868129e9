//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`DocumentStore`, `BlobStore`, `PushMessenger`) are
//! implemented by outbound adapters. Driving ports are implemented by the
//! domain services and consumed by the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_store;
mod document_store;
mod library_repository;
mod progress_table;
mod push_dispatch;
mod push_messenger;
mod student_directory;
mod teacher_recommendations;
mod weekly_schedule;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, StoredBlob};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    BatchWrite, Direction, DocumentQuery, DocumentStore, DocumentStoreError, OrderBy, StartAfter,
    WriteBatch,
};
#[cfg(test)]
pub use library_repository::MockLibraryRepository;
pub use library_repository::LibraryRepository;
#[cfg(test)]
pub use progress_table::MockProgressTable;
pub use progress_table::ProgressTable;
#[cfg(test)]
pub use push_dispatch::MockPushDispatch;
pub use push_dispatch::PushDispatch;
#[cfg(test)]
pub use push_messenger::MockPushMessenger;
pub use push_messenger::{PushMessenger, PushMessengerError};
#[cfg(test)]
pub use student_directory::MockStudentDirectory;
pub use student_directory::StudentDirectory;
#[cfg(test)]
pub use teacher_recommendations::MockTeacherRecommendations;
pub use teacher_recommendations::TeacherRecommendations;
#[cfg(test)]
pub use weekly_schedule::MockWeeklySchedule;
pub use weekly_schedule::WeeklySchedule;
