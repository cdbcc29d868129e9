//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod files;
pub mod health;
pub mod library;
pub mod progress;
pub mod push;
pub mod recommendations;
pub mod responses;
pub mod schedule;
pub mod schemas;
pub mod state;
pub mod students;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Prefix of the JSON API.
pub const API_PREFIX: &str = "/api/v1";

/// Malformed JSON bodies become `INVALID_REQUEST` payloads.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed request body: {err}")).into()
    })
}

/// Malformed query strings become `INVALID_REQUEST` payloads.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    })
}

/// Register the API scope and the blob download route.
///
/// Expects `web::Data<HttpState>` in app data.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use classdesk::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(web::PayloadConfig::new(files::MAX_UPLOAD_BYTES))
        .service(
            web::scope(API_PREFIX)
                .service(library::list_courses)
                .service(library::create_course)
                .service(library::update_course)
                .service(library::delete_course)
                .service(library::list_chapters)
                .service(library::create_chapter)
                .service(library::update_chapter)
                .service(library::delete_chapter)
                .service(library::list_lessons)
                .service(library::create_lesson)
                .service(library::update_lesson)
                .service(library::delete_lesson)
                .service(library::list_homeworks)
                .service(library::create_homework)
                .service(library::update_homework)
                .service(library::delete_homework)
                .service(library::get_library)
                .service(files::upload_homework_file)
                .service(files::homework_file_url)
                .service(files::delete_homework_file)
                .service(files::upload_loose_file)
                .service(files::loose_file_url)
                .service(files::delete_loose_file)
                .service(students::list_students)
                .service(students::create_student)
                .service(students::get_student)
                .service(students::update_student)
                .service(students::register_push_token)
                .service(students::clear_push_token)
                .service(progress::list_progress)
                .service(progress::add_row)
                .service(progress::delete_row)
                .service(progress::append_files)
                .service(progress::remove_file)
                .service(progress::set_percentage)
                .service(schedule::list_entries)
                .service(schedule::add_entry)
                .service(schedule::update_entry)
                .service(schedule::delete_entry)
                .service(recommendations::list_tabs)
                .service(recommendations::save_tabs)
                .service(recommendations::delete_tab)
                .service(push::notifications_resource()),
        )
        .service(files::serve_blob);
}
