//! OpenAPI documentation for the REST API.
//!
//! Served by Swagger UI in debug builds and printed by the `openapi-dump`
//! binary.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::{
    files, health, library, progress, push, recommendations, schedule, students,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Classdesk backend API",
        description = "Course library, progress tracking, schedules, recommendations and push notifications for the classroom dashboard."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        library::list_courses,
        library::create_course,
        library::update_course,
        library::delete_course,
        library::list_chapters,
        library::create_chapter,
        library::update_chapter,
        library::delete_chapter,
        library::list_lessons,
        library::create_lesson,
        library::update_lesson,
        library::delete_lesson,
        library::list_homeworks,
        library::create_homework,
        library::update_homework,
        library::delete_homework,
        library::get_library,
        files::upload_homework_file,
        files::homework_file_url,
        files::delete_homework_file,
        files::upload_loose_file,
        files::loose_file_url,
        files::delete_loose_file,
        files::serve_blob,
        students::list_students,
        students::create_student,
        students::get_student,
        students::update_student,
        students::register_push_token,
        students::clear_push_token,
        progress::list_progress,
        progress::add_row,
        progress::delete_row,
        progress::append_files,
        progress::remove_file,
        progress::set_percentage,
        schedule::list_entries,
        schedule::add_entry,
        schedule::update_entry,
        schedule::delete_entry,
        recommendations::list_tabs,
        recommendations::save_tabs,
        recommendations::delete_tab,
        push::send_notification,
        health::ready,
        health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "library", description = "Courses, chapters, lessons and homeworks"),
        (name = "files", description = "Homework and loose file storage"),
        (name = "students", description = "Student directory and push tokens"),
        (name = "progress", description = "Student progress table"),
        (name = "schedule", description = "Weekly schedule"),
        (name = "recommendations", description = "Teacher recommendation tabs"),
        (name = "notifications", description = "Push notification delivery"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
