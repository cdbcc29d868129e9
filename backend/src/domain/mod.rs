//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities of the classroom dashboard
//! (course library, progress table, students, schedule, recommendations
//! and push dispatch) and the services implementing the driving ports in
//! [`ports`]. Types here never depend on a concrete store or transport.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - Document paths and field updates used by the document store port.
//! - Library keys and entities, progress rows and the soft join.
//! - One service per driving port.

pub mod document;
pub mod error;
pub mod files;
pub mod library;
pub mod ports;
pub mod progress;
pub mod push;
pub mod recommendations;
pub mod schedule;
pub mod student;
pub mod trace_id;

mod library_service;
mod progress_service;
mod push_service;
mod recommendations_service;
mod schedule_service;
mod service_support;
mod student_service;

pub use self::document::{
    CollectionPath, Document, DocumentId, DocumentPath, FieldMap, FieldPath, FieldUpdate,
    GENERATED_ID_LEN, PathValidationError, apply_updates, collections, compare_values, field_at,
    updates_from_fields,
};
pub use self::error::{Error, ErrorCode};
pub use self::files::{
    BlobPath, FileName, FileNameError, FileRef, FileUpload, LOOSE_FILES_PREFIX,
};
pub use self::library::{
    Chapter, ChapterKey, ChapterNode, Course, CourseKey, CourseNode, Homework, HomeworkDraft,
    HomeworkKey, Lesson, LessonDraft, LessonKey, LibraryPatch, LibraryRef, LibrarySnapshot,
    ResolvedRefs, Section, SectionDraft, courses_collection, fields as library_fields,
};
pub use self::progress::{
    FileField, JoinedProgressRow, PercentField, ProgressCursorKey, ProgressDraft, ProgressPage,
    ProgressResults, ProgressRow, ProgressView, UnknownField, fields as progress_fields,
    table_collection,
};
pub use self::push::{
    MessageId, PushMessage, PushReceipt, PushRequest, ValidPushRequest, stringify,
};
pub use self::recommendations::{
    RecommendationItem, RecommendationTab, fields as recommendation_fields, tabs_collection,
};
pub use self::schedule::{
    ScheduleDraft, ScheduleEntry, fields as schedule_fields, schedule_collection, sort_week,
    weekday_rank,
};
pub use self::student::{
    Student, StudentDraft, clear_token_updates, fields as student_fields,
    register_token_updates, students_collection,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

pub use self::library_service::LibraryService;
pub use self::progress_service::ProgressService;
pub use self::push_service::PushService;
pub use self::recommendations_service::RecommendationsService;
pub use self::schedule_service::ScheduleService;
pub use self::student_service::StudentService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use classdesk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
