//! Course library endpoints.
//!
//! ```text
//! GET    /api/v1/courses
//! POST   /api/v1/courses
//! PATCH  /api/v1/courses/{courseId}
//! DELETE /api/v1/courses/{courseId}
//! ...    /chapters, /lessons and /homeworks nest below their parent
//! GET    /api/v1/library
//! ```
//!
//! Every listing reads the store afresh, so a create followed by a list
//! always includes the new document.

use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::domain::{
    Course, Homework, HomeworkDraft, Lesson, LessonDraft, LibraryPatch, LibrarySnapshot, Section,
    SectionDraft,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{CreatedResponse, created, no_content};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{chapter_key, course_key, homework_key, lesson_key};

/// List courses ordered by `order`.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Courses", body = [Section]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Course>>> {
    Ok(web::Json(state.library.list_courses().await?))
}

/// Create a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = SectionDraft,
    responses(
        (status = 201, description = "Course created", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    payload: web::Json<SectionDraft>,
) -> ApiResult<HttpResponse> {
    let id = state.library.create_course(payload.into_inner()).await?;
    Ok(created(id))
}

/// Merge fields into a course.
#[utoipa::path(
    patch,
    path = "/api/v1/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body = LibraryPatch,
    responses(
        (status = 204, description = "Course updated"),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "updateCourse"
)]
#[patch("/courses/{courseId}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<LibraryPatch>,
) -> ApiResult<HttpResponse> {
    let key = course_key(&path)?;
    state
        .library
        .update_course(&key, payload.into_inner())
        .await?;
    Ok(no_content())
}

/// Delete a course. Chapters below it are left in place.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{courseId}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.library.delete_course(&course_key(&path)?).await?;
    Ok(no_content())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/chapters",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses((status = 200, description = "Chapters", body = [Section])),
    tags = ["library"],
    operation_id = "listChapters"
)]
#[get("/courses/{courseId}/chapters")]
pub async fn list_chapters(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Section>>> {
    let key = course_key(&path)?;
    Ok(web::Json(state.library.list_chapters(&key).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{courseId}/chapters",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body = SectionDraft,
    responses((status = 201, description = "Chapter created", body = CreatedResponse)),
    tags = ["library"],
    operation_id = "createChapter"
)]
#[post("/courses/{courseId}/chapters")]
pub async fn create_chapter(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SectionDraft>,
) -> ApiResult<HttpResponse> {
    let key = course_key(&path)?;
    let id = state
        .library
        .create_chapter(&key, payload.into_inner())
        .await?;
    Ok(created(id))
}

#[utoipa::path(
    patch,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier")
    ),
    request_body = LibraryPatch,
    responses(
        (status = 204, description = "Chapter updated"),
        (status = 404, description = "Chapter not found", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "updateChapter"
)]
#[patch("/courses/{courseId}/chapters/{chapterId}")]
pub async fn update_chapter(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<LibraryPatch>,
) -> ApiResult<HttpResponse> {
    let (course, chapter) = path.into_inner();
    let key = chapter_key((&course, &chapter))?;
    state
        .library
        .update_chapter(&key, payload.into_inner())
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier")
    ),
    responses((status = 204, description = "Chapter deleted")),
    tags = ["library"],
    operation_id = "deleteChapter"
)]
#[delete("/courses/{courseId}/chapters/{chapterId}")]
pub async fn delete_chapter(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (course, chapter) = path.into_inner();
    state
        .library
        .delete_chapter(&chapter_key((&course, &chapter))?)
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier")
    ),
    responses((status = 200, description = "Lessons", body = [Lesson])),
    tags = ["library"],
    operation_id = "listLessons"
)]
#[get("/courses/{courseId}/chapters/{chapterId}/lessons")]
pub async fn list_lessons(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<Lesson>>> {
    let (course, chapter) = path.into_inner();
    let key = chapter_key((&course, &chapter))?;
    Ok(web::Json(state.library.list_lessons(&key).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier")
    ),
    request_body = LessonDraft,
    responses((status = 201, description = "Lesson created", body = CreatedResponse)),
    tags = ["library"],
    operation_id = "createLesson"
)]
#[post("/courses/{courseId}/chapters/{chapterId}/lessons")]
pub async fn create_lesson(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<LessonDraft>,
) -> ApiResult<HttpResponse> {
    let (course, chapter) = path.into_inner();
    let key = chapter_key((&course, &chapter))?;
    let id = state
        .library
        .create_lesson(&key, payload.into_inner())
        .await?;
    Ok(created(id))
}

#[utoipa::path(
    patch,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier")
    ),
    request_body = LibraryPatch,
    responses(
        (status = 204, description = "Lesson updated"),
        (status = 404, description = "Lesson not found", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "updateLesson"
)]
#[patch("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}")]
pub async fn update_lesson(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String)>,
    payload: web::Json<LibraryPatch>,
) -> ApiResult<HttpResponse> {
    let (course, chapter, lesson) = path.into_inner();
    let key = lesson_key((&course, &chapter, &lesson))?;
    state
        .library
        .update_lesson(&key, payload.into_inner())
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier")
    ),
    responses((status = 204, description = "Lesson deleted")),
    tags = ["library"],
    operation_id = "deleteLesson"
)]
#[delete("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}")]
pub async fn delete_lesson(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String)>,
) -> ApiResult<HttpResponse> {
    let (course, chapter, lesson) = path.into_inner();
    state
        .library
        .delete_lesson(&lesson_key((&course, &chapter, &lesson))?)
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier")
    ),
    responses((status = 200, description = "Homeworks", body = [Homework])),
    tags = ["library"],
    operation_id = "listHomeworks"
)]
#[get("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks")]
pub async fn list_homeworks(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String)>,
) -> ApiResult<web::Json<Vec<Homework>>> {
    let (course, chapter, lesson) = path.into_inner();
    let key = lesson_key((&course, &chapter, &lesson))?;
    Ok(web::Json(state.library.list_homeworks(&key).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier")
    ),
    request_body = HomeworkDraft,
    responses((status = 201, description = "Homework created", body = CreatedResponse)),
    tags = ["library"],
    operation_id = "createHomework"
)]
#[post("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks")]
pub async fn create_homework(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String)>,
    payload: web::Json<HomeworkDraft>,
) -> ApiResult<HttpResponse> {
    let (course, chapter, lesson) = path.into_inner();
    let key = lesson_key((&course, &chapter, &lesson))?;
    let id = state
        .library
        .create_homework(&key, payload.into_inner())
        .await?;
    Ok(created(id))
}

#[utoipa::path(
    patch,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier"),
        ("homeworkId" = String, Path, description = "Homework identifier")
    ),
    request_body = LibraryPatch,
    responses(
        (status = 204, description = "Homework updated"),
        (status = 404, description = "Homework not found", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "updateHomework"
)]
#[patch("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}")]
pub async fn update_homework(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String, String)>,
    payload: web::Json<LibraryPatch>,
) -> ApiResult<HttpResponse> {
    let (course, chapter, lesson, homework) = path.into_inner();
    let key = homework_key((&course, &chapter, &lesson, &homework))?;
    state
        .library
        .update_homework(&key, payload.into_inner())
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier"),
        ("homeworkId" = String, Path, description = "Homework identifier")
    ),
    responses((status = 204, description = "Homework deleted")),
    tags = ["library"],
    operation_id = "deleteHomework"
)]
#[delete("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}")]
pub async fn delete_homework(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String, String)>,
) -> ApiResult<HttpResponse> {
    let (course, chapter, lesson, homework) = path.into_inner();
    state
        .library
        .delete_homework(&homework_key((&course, &chapter, &lesson, &homework))?)
        .await?;
    Ok(no_content())
}

/// Whole library tree used for lookups and the soft join.
#[utoipa::path(
    get,
    path = "/api/v1/library",
    responses((status = 200, description = "Library snapshot", body = LibrarySnapshot)),
    tags = ["library"],
    operation_id = "getLibrary"
)]
#[get("/library")]
pub async fn get_library(state: web::Data<HttpState>) -> ApiResult<web::Json<LibrarySnapshot>> {
    Ok(web::Json(state.library.snapshot().await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use mockall::predicate::eq;
    use serde_json::{Value, json};

    use crate::domain::{CourseKey, DocumentId, Error, FieldMap};
    use crate::inbound::http::configure;
    use crate::inbound::http::test_utils::MockPorts;

    fn section(id: &str, name: &str, order: i64) -> crate::domain::Section {
        crate::domain::Section {
            id: DocumentId::new(id).expect("id"),
            name: name.to_owned(),
            order,
            extra: FieldMap::new(),
        }
    }

    #[actix_web::test]
    async fn lists_courses_as_json() {
        let mut ports = MockPorts::default();
        ports
            .library
            .expect_list_courses()
            .times(1)
            .return_once(|| Ok(vec![section("algebra", "Algebra", 1)]));
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/courses").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!([{ "id": "algebra", "name": "Algebra", "order": 1 }]));
    }

    #[actix_web::test]
    async fn create_course_returns_created_id() {
        let mut ports = MockPorts::default();
        ports
            .library
            .expect_create_course()
            .withf(|draft| draft.name == "Geometry")
            .times(1)
            .return_once(|_| Ok(DocumentId::new("geo").expect("id")));
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/courses")
                .set_json(json!({ "name": "Geometry", "order": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["id"], "geo");
    }

    #[actix_web::test]
    async fn delete_course_maps_not_found() {
        let mut ports = MockPorts::default();
        ports
            .library
            .expect_delete_course()
            .with(eq(CourseKey::new(DocumentId::new("gone").expect("id"))))
            .return_once(|_| Err(Error::not_found("course gone not found")));
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/v1/courses/gone")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_ids_are_rejected_before_the_port() {
        let ports = MockPorts::default();
        let app = test::init_service(App::new().app_data(ports.into_data()).configure(configure))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/courses/c1/chapters/%2E%2E/lessons")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
