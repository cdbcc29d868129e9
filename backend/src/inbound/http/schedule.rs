//! Weekly schedule endpoints.

use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::domain::{LibraryPatch, ScheduleDraft, ScheduleEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{CreatedResponse, created, no_content};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ParamName, parse_id};

const STUDENT: ParamName = ParamName::new("studentId");
const ENTRY: ParamName = ParamName::new("entryId");

/// A student's week, Monday first, then by time.
#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}/schedule",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses((status = 200, description = "Schedule entries", body = [ScheduleEntry])),
    tags = ["schedule"],
    operation_id = "listSchedule"
)]
#[get("/students/{studentId}/schedule")]
pub async fn list_entries(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ScheduleEntry>>> {
    let student_id = parse_id(&path, STUDENT)?;
    Ok(web::Json(state.schedule.list_entries(&student_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/students/{studentId}/schedule",
    params(("studentId" = String, Path, description = "Student identifier")),
    request_body = ScheduleDraft,
    responses((status = 201, description = "Entry created", body = CreatedResponse)),
    tags = ["schedule"],
    operation_id = "addScheduleEntry"
)]
#[post("/students/{studentId}/schedule")]
pub async fn add_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ScheduleDraft>,
) -> ApiResult<HttpResponse> {
    let student_id = parse_id(&path, STUDENT)?;
    let id = state
        .schedule
        .add_entry(&student_id, payload.into_inner())
        .await?;
    Ok(created(id))
}

#[utoipa::path(
    patch,
    path = "/api/v1/schedule/{entryId}",
    params(("entryId" = String, Path, description = "Entry identifier")),
    request_body = LibraryPatch,
    responses(
        (status = 204, description = "Entry updated"),
        (status = 404, description = "Entry not found", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "updateScheduleEntry"
)]
#[patch("/schedule/{entryId}")]
pub async fn update_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<LibraryPatch>,
) -> ApiResult<HttpResponse> {
    let entry_id = parse_id(&path, ENTRY)?;
    state
        .schedule
        .update_entry(&entry_id, payload.into_inner())
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    delete,
    path = "/api/v1/schedule/{entryId}",
    params(("entryId" = String, Path, description = "Entry identifier")),
    responses((status = 204, description = "Entry deleted")),
    tags = ["schedule"],
    operation_id = "deleteScheduleEntry"
)]
#[delete("/schedule/{entryId}")]
pub async fn delete_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .schedule
        .delete_entry(&parse_id(&path, ENTRY)?)
        .await?;
    Ok(no_content())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    use crate::domain::DocumentId;
    use crate::inbound::http::configure;
    use crate::inbound::http::test_utils::MockPorts;

    #[actix_web::test]
    async fn add_entry_scopes_draft_to_student() {
        let mut ports = MockPorts::default();
        ports
            .schedule
            .expect_add_entry()
            .withf(|student, draft| {
                student.as_str() == "s1" && draft.day == "Monday" && draft.subject == "Maths"
            })
            .return_once(|_, _| Ok(DocumentId::new("e1").expect("id")));
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/students/s1/schedule")
                .set_json(json!({ "day": "Monday", "time": "09:00", "subject": "Maths" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
}
