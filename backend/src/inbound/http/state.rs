//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against mocks or the in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{
    LibraryRepository, ProgressTable, PushDispatch, StudentDirectory, TeacherRecommendations,
    WeeklySchedule,
};

/// Allow-origin used when none is configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub library: Arc<dyn LibraryRepository>,
    pub progress: Arc<dyn ProgressTable>,
    pub students: Arc<dyn StudentDirectory>,
    pub schedule: Arc<dyn WeeklySchedule>,
    pub recommendations: Arc<dyn TeacherRecommendations>,
    pub push: Arc<dyn PushDispatch>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub library: Arc<dyn LibraryRepository>,
    pub progress: Arc<dyn ProgressTable>,
    pub students: Arc<dyn StudentDirectory>,
    pub schedule: Arc<dyn WeeklySchedule>,
    pub recommendations: Arc<dyn TeacherRecommendations>,
    pub push: Arc<dyn PushDispatch>,
    /// Value of `Access-Control-Allow-Origin` on the push endpoint.
    pub cors_allowed_origin: String,
}

impl HttpState {
    /// Build state with an explicit CORS origin.
    pub fn new(ports: HttpStatePorts, cors_allowed_origin: impl Into<String>) -> Self {
        let HttpStatePorts {
            library,
            progress,
            students,
            schedule,
            recommendations,
            push,
        } = ports;
        Self {
            library,
            progress,
            students,
            schedule,
            recommendations,
            push,
            cors_allowed_origin: cors_allowed_origin.into(),
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, DEFAULT_ALLOWED_ORIGIN)
    }
}
