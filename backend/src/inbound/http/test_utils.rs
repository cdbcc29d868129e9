//! Test helpers for the HTTP handlers.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockLibraryRepository, MockProgressTable, MockPushDispatch, MockStudentDirectory,
    MockTeacherRecommendations, MockWeeklySchedule,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// One mock per driving port. Unconfigured mocks panic when called, so
/// tests only set expectations for the port they exercise.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub library: MockLibraryRepository,
    pub progress: MockProgressTable,
    pub students: MockStudentDirectory,
    pub schedule: MockWeeklySchedule,
    pub recommendations: MockTeacherRecommendations,
    pub push: MockPushDispatch,
}

impl MockPorts {
    pub(crate) fn into_data(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::from(HttpStatePorts {
            library: Arc::new(self.library),
            progress: Arc::new(self.progress),
            students: Arc::new(self.students),
            schedule: Arc::new(self.schedule),
            recommendations: Arc::new(self.recommendations),
            push: Arc::new(self.push),
        }))
    }
}
