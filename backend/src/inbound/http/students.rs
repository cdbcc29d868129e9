//! Student directory endpoints.
//!
//! ```text
//! GET|POST      /api/v1/students
//! GET|PATCH     /api/v1/students/{studentId}
//! PUT|DELETE    /api/v1/students/{studentId}/push-token
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{LibraryPatch, Student, StudentDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{CreatedResponse, created, no_content};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ParamName, parse_id};

const STUDENT: ParamName = ParamName::new("studentId");

/// Device token issued by the messaging backend.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PushTokenRequest {
    pub token: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/students",
    responses((status = 200, description = "Students", body = [Student])),
    tags = ["students"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Student>>> {
    Ok(web::Json(state.students.list_students().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = StudentDraft,
    responses(
        (status = 201, description = "Student created", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "createStudent"
)]
#[post("/students")]
pub async fn create_student(
    state: web::Data<HttpState>,
    payload: web::Json<StudentDraft>,
) -> ApiResult<HttpResponse> {
    let id = state.students.create_student(payload.into_inner()).await?;
    Ok(created(id))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "getStudent"
)]
#[get("/students/{studentId}")]
pub async fn get_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Student>> {
    let id = parse_id(&path, STUDENT)?;
    Ok(web::Json(state.students.get_student(&id).await?))
}

/// Merge profile fields. Push settings go through the push-token endpoints.
#[utoipa::path(
    patch,
    path = "/api/v1/students/{studentId}",
    params(("studentId" = String, Path, description = "Student identifier")),
    request_body = LibraryPatch,
    responses(
        (status = 204, description = "Student updated"),
        (status = 400, description = "Patch touches push settings", body = ErrorSchema),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "updateStudent"
)]
#[patch("/students/{studentId}")]
pub async fn update_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<LibraryPatch>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, STUDENT)?;
    state
        .students
        .update_student(&id, payload.into_inner())
        .await?;
    Ok(no_content())
}

/// Store a device token and switch notifications on.
#[utoipa::path(
    put,
    path = "/api/v1/students/{studentId}/push-token",
    params(("studentId" = String, Path, description = "Student identifier")),
    request_body = PushTokenRequest,
    responses(
        (status = 204, description = "Token registered"),
        (status = 400, description = "Blank token", body = ErrorSchema),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "registerPushToken"
)]
#[put("/students/{studentId}/push-token")]
pub async fn register_push_token(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PushTokenRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, STUDENT)?;
    state
        .students
        .register_push_token(&id, payload.into_inner().token)
        .await?;
    Ok(no_content())
}

/// Drop the device token and switch notifications off.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{studentId}/push-token",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses(
        (status = 204, description = "Token cleared"),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "clearPushToken"
)]
#[delete("/students/{studentId}/push-token")]
pub async fn clear_push_token(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, STUDENT)?;
    state.students.clear_push_token(&id).await?;
    Ok(no_content())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::domain::{DocumentId, Error, FieldMap, Student};
    use crate::inbound::http::configure;
    use crate::inbound::http::test_utils::MockPorts;

    #[actix_web::test]
    async fn get_student_serialises_camel_case() {
        let mut ports = MockPorts::default();
        ports.students.expect_get_student().return_once(|id| {
            Ok(Student {
                id: id.clone(),
                name: "Ada".to_owned(),
                email: "ada@example.org".to_owned(),
                fcm_token: Some("tok".to_owned()),
                push_notifications_enabled: true,
                extra: FieldMap::new(),
            })
        });
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/students/s1").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["fcmToken"], "tok");
        assert_eq!(body["pushNotificationsEnabled"], true);
    }

    #[actix_web::test]
    async fn register_push_token_passes_token_through() {
        let mut ports = MockPorts::default();
        ports
            .students
            .expect_register_push_token()
            .withf(|id, token| id == &DocumentId::new("s1").expect("id") && token == "tok-1")
            .times(1)
            .return_once(|_, _| Ok(()));
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/students/s1/push-token")
                .set_json(json!({ "token": "tok-1" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn unknown_student_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .students
            .expect_clear_push_token()
            .return_once(|_| Err(Error::not_found("student s9 not found")));
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/v1/students/s9/push-token")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
