//! Student progress table endpoints.
//!
//! ```text
//! GET    /api/v1/students/{studentId}/progress?cursor&limit&view
//! POST   /api/v1/progress
//! DELETE /api/v1/progress/{rowId}
//! POST   /api/v1/progress/{rowId}/files/{field}
//! DELETE /api/v1/progress/{rowId}/files/{field}?url=
//! PUT    /api/v1/progress/{rowId}/percentages/{field}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, JoinedProgressRow, ProgressDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{CreatedResponse, created, no_content};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ParamName, parse_file_field, parse_id, parse_percent_field, parse_view,
};

const STUDENT: ParamName = ParamName::new("studentId");
const ROW: ParamName = ParamName::new("rowId");

/// Query string of the progress listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProgressQuery {
    /// Cursor returned as `nextCursor` by the previous page.
    pub cursor: Option<String>,
    /// Page size, 1 to 100; defaults to 20.
    pub limit: Option<usize>,
    /// Keep only rows in this view: `completed`, `homework` or `future`.
    pub view: Option<String>,
}

/// Page envelope of joined progress rows.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProgressPageSchema {
    data: Vec<JoinedProgressRow>,
    limit: usize,
    next_cursor: Option<String>,
    links: serde_json::Value,
}

/// URLs to append to a file array.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AppendFilesRequest {
    pub urls: Vec<String>,
}

/// Query naming the URL to remove.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemoveFileQuery {
    pub url: String,
}

/// Array contents after a mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

/// New percentage value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PercentageRequest {
    pub value: f64,
}

/// One page of a student's progress rows joined against the library.
///
/// Rows whose course, chapter or lesson no longer exists are returned with
/// the corresponding reference left empty.
#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}/progress",
    params(
        ("studentId" = String, Path, description = "Student identifier"),
        ProgressQuery
    ),
    responses(
        (status = 200, description = "Progress page", body = ProgressPageSchema),
        (status = 400, description = "Invalid cursor, limit or view", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "listProgress"
)]
#[get("/students/{studentId}/progress")]
pub async fn list_progress(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ProgressQuery>,
) -> ApiResult<web::Json<Paginated<JoinedProgressRow>>> {
    let student_id = parse_id(&path, STUDENT)?;
    let ProgressQuery {
        cursor,
        limit,
        view,
    } = query.into_inner();
    let view = view.as_deref().map(parse_view).transpose()?;
    let effective_limit = PageParams::new(cursor.clone(), limit)
        .limit()
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let page = state
        .progress
        .fetch_joined_page(&student_id, cursor, limit)
        .await?;
    let rows = match view {
        Some(view) => page.rows.into_iter().filter(|row| row.view == view).collect(),
        None => page.rows,
    };
    Ok(web::Json(Paginated::new(
        rows,
        effective_limit,
        page.next_cursor,
        &request.full_url(),
    )))
}

/// Add a progress row; `timestamp` is stamped by the server.
#[utoipa::path(
    post,
    path = "/api/v1/progress",
    request_body = ProgressDraft,
    responses(
        (status = 201, description = "Row created", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "addProgressRow"
)]
#[post("/progress")]
pub async fn add_row(
    state: web::Data<HttpState>,
    payload: web::Json<ProgressDraft>,
) -> ApiResult<HttpResponse> {
    let id = state.progress.add_row(payload.into_inner()).await?;
    Ok(created(id))
}

#[utoipa::path(
    delete,
    path = "/api/v1/progress/{rowId}",
    params(("rowId" = String, Path, description = "Row identifier")),
    responses(
        (status = 204, description = "Row deleted"),
        (status = 404, description = "Row not found", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "deleteProgressRow"
)]
#[delete("/progress/{rowId}")]
pub async fn delete_row(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.progress.delete_row(&parse_id(&path, ROW)?).await?;
    Ok(no_content())
}

/// Append URLs to `submittedFiles`, `checkedFiles` or `results.files`.
#[utoipa::path(
    post,
    path = "/api/v1/progress/{rowId}/files/{field}",
    params(
        ("rowId" = String, Path, description = "Row identifier"),
        ("field" = String, Path, description = "submittedFiles, checkedFiles or results.files")
    ),
    request_body = AppendFilesRequest,
    responses(
        (status = 200, description = "Updated array", body = FilesResponse),
        (status = 404, description = "Row not found", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "appendProgressFiles"
)]
#[post("/progress/{rowId}/files/{field}")]
pub async fn append_files(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<AppendFilesRequest>,
) -> ApiResult<web::Json<FilesResponse>> {
    let (row, field) = path.into_inner();
    let files = state
        .progress
        .append_files(
            &parse_id(&row, ROW)?,
            parse_file_field(&field)?,
            payload.into_inner().urls,
        )
        .await?;
    Ok(web::Json(FilesResponse { files }))
}

/// Remove every occurrence of `url` from a file array.
#[utoipa::path(
    delete,
    path = "/api/v1/progress/{rowId}/files/{field}",
    params(
        ("rowId" = String, Path, description = "Row identifier"),
        ("field" = String, Path, description = "submittedFiles, checkedFiles or results.files"),
        RemoveFileQuery
    ),
    responses(
        (status = 200, description = "Updated array", body = FilesResponse),
        (status = 404, description = "Row not found", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "removeProgressFile"
)]
#[delete("/progress/{rowId}/files/{field}")]
pub async fn remove_file(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    query: web::Query<RemoveFileQuery>,
) -> ApiResult<web::Json<FilesResponse>> {
    let (row, field) = path.into_inner();
    let files = state
        .progress
        .remove_file(
            &parse_id(&row, ROW)?,
            parse_file_field(&field)?,
            query.into_inner().url,
        )
        .await?;
    Ok(web::Json(FilesResponse { files }))
}

#[utoipa::path(
    put,
    path = "/api/v1/progress/{rowId}/percentages/{field}",
    params(
        ("rowId" = String, Path, description = "Row identifier"),
        ("field" = String, Path, description = "progress or results.percentage")
    ),
    request_body = PercentageRequest,
    responses(
        (status = 204, description = "Percentage stored"),
        (status = 400, description = "Unknown field or value out of range", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "setProgressPercentage"
)]
#[put("/progress/{rowId}/percentages/{field}")]
pub async fn set_percentage(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<PercentageRequest>,
) -> ApiResult<HttpResponse> {
    let (row, field) = path.into_inner();
    state
        .progress
        .set_percentage(
            &parse_id(&row, ROW)?,
            parse_percent_field(&field)?,
            payload.into_inner().value,
        )
        .await?;
    Ok(no_content())
}
