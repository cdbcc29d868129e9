//! File upload, URL lookup and download endpoints.
//!
//! ```text
//! PUT|GET|DELETE /api/v1/courses/{c}/chapters/{ch}/lessons/{l}/homeworks/{h}/files/{name}
//! PUT|GET|DELETE /api/v1/files/{name}
//! GET            /blobs/{path}
//! ```
//!
//! Uploads take the raw request body; the `Content-Type` header is stored
//! alongside the bytes and replayed when the blob is served.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, delete, get, put, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BlobPath, Error, FileRef, FileUpload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::no_content;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{homework_key, parse_file_name};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Retrieval URL of a stored file.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileUrlResponse {
    pub url: String,
}

fn upload_from(request: &HttpRequest, body: web::Bytes) -> Result<FileUpload, Error> {
    if body.is_empty() {
        return Err(Error::invalid_request("upload body must not be empty"));
    }
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    Ok(FileUpload {
        bytes: body.to_vec(),
        content_type,
    })
}

type HomeworkFilePath = web::Path<(String, String, String, String, String)>;

/// Upload a file attached to a homework.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}/files/{name}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier"),
        ("homeworkId" = String, Path, description = "Homework identifier"),
        ("name" = String, Path, description = "File name")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored file", body = FileRef),
        (status = 400, description = "Invalid name or empty body", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "uploadHomeworkFile"
)]
#[put("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}/files/{name}")]
pub async fn upload_homework_file(
    state: web::Data<HttpState>,
    path: HomeworkFilePath,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<FileRef>> {
    let (course, chapter, lesson, homework, name) = path.into_inner();
    let key = homework_key((&course, &chapter, &lesson, &homework))?;
    let name = parse_file_name(&name)?;
    let upload = upload_from(&request, body)?;
    let file = state
        .library
        .upload_homework_file(&key, name, upload)
        .await?;
    Ok(web::Json(file))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}/files/{name}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier"),
        ("homeworkId" = String, Path, description = "Homework identifier"),
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "Retrieval URL", body = FileUrlResponse),
        (status = 404, description = "No such file", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "getHomeworkFileUrl"
)]
#[get("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}/files/{name}")]
pub async fn homework_file_url(
    state: web::Data<HttpState>,
    path: HomeworkFilePath,
) -> ApiResult<web::Json<FileUrlResponse>> {
    let (course, chapter, lesson, homework, name) = path.into_inner();
    let key = homework_key((&course, &chapter, &lesson, &homework))?;
    let url = state
        .library
        .homework_file_url(&key, &parse_file_name(&name)?)
        .await?;
    Ok(web::Json(FileUrlResponse {
        url: url.to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}/files/{name}",
    params(
        ("courseId" = String, Path, description = "Course identifier"),
        ("chapterId" = String, Path, description = "Chapter identifier"),
        ("lessonId" = String, Path, description = "Lesson identifier"),
        ("homeworkId" = String, Path, description = "Homework identifier"),
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "No such file", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "deleteHomeworkFile"
)]
#[delete("/courses/{courseId}/chapters/{chapterId}/lessons/{lessonId}/homeworks/{homeworkId}/files/{name}")]
pub async fn delete_homework_file(
    state: web::Data<HttpState>,
    path: HomeworkFilePath,
) -> ApiResult<HttpResponse> {
    let (course, chapter, lesson, homework, name) = path.into_inner();
    let key = homework_key((&course, &chapter, &lesson, &homework))?;
    state
        .library
        .delete_homework_file(&key, &parse_file_name(&name)?)
        .await?;
    Ok(no_content())
}

/// Upload a file outside the library hierarchy.
#[utoipa::path(
    put,
    path = "/api/v1/files/{name}",
    params(("name" = String, Path, description = "File name")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored file", body = FileRef),
        (status = 400, description = "Invalid name or empty body", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "uploadFile"
)]
#[put("/files/{name}")]
pub async fn upload_loose_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<FileRef>> {
    let name = parse_file_name(&path)?;
    let upload = upload_from(&request, body)?;
    Ok(web::Json(state.library.upload_loose_file(name, upload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/files/{name}",
    params(("name" = String, Path, description = "File name")),
    responses(
        (status = 200, description = "Retrieval URL", body = FileUrlResponse),
        (status = 404, description = "No such file", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "getFileUrl"
)]
#[get("/files/{name}")]
pub async fn loose_file_url(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FileUrlResponse>> {
    let url = state.library.loose_file_url(&parse_file_name(&path)?).await?;
    Ok(web::Json(FileUrlResponse {
        url: url.to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/files/{name}",
    params(("name" = String, Path, description = "File name")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "No such file", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "deleteFile"
)]
#[delete("/files/{name}")]
pub async fn delete_loose_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .library
        .delete_loose_file(&parse_file_name(&path)?)
        .await?;
    Ok(no_content())
}

/// Serve stored bytes at the URL handed out on upload.
#[utoipa::path(
    get,
    path = "/blobs/{path}",
    params(("path" = String, Path, description = "Slash-separated blob path")),
    responses(
        (status = 200, description = "File content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "downloadBlob"
)]
#[get("/blobs/{path:.*}")]
pub async fn serve_blob(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let blob_path =
        BlobPath::parse(&path).map_err(|err| Error::invalid_request(err.to_string()))?;
    let blob = state.library.read_file(&blob_path).await?;
    let mut response = HttpResponse::Ok();
    match blob.content_type {
        Some(content_type) => response.insert_header((header::CONTENT_TYPE, content_type)),
        None => response.insert_header(ContentType::octet_stream()),
    };
    Ok(response.body(blob.bytes))
}
