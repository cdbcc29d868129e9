//! Teacher recommendation tabs.

use actix_web::{HttpResponse, delete, get, put, web};

use crate::domain::RecommendationTab;
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::no_content;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ParamName, parse_id};

const STUDENT: ParamName = ParamName::new("studentId");

#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}/recommendations",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses((status = 200, description = "Tabs", body = [RecommendationTab])),
    tags = ["recommendations"],
    operation_id = "listRecommendationTabs"
)]
#[get("/students/{studentId}/recommendations")]
pub async fn list_tabs(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<RecommendationTab>>> {
    let student_id = parse_id(&path, STUDENT)?;
    Ok(web::Json(state.recommendations.list_tabs(&student_id).await?))
}

/// Save every tab in one all-or-nothing write.
#[utoipa::path(
    put,
    path = "/api/v1/students/{studentId}/recommendations",
    params(("studentId" = String, Path, description = "Student identifier")),
    request_body = [RecommendationTab],
    responses(
        (status = 204, description = "Tabs saved"),
        (status = 500, description = "Batch failed, nothing written", body = ErrorSchema),
        (status = 503, description = "Store unavailable, nothing written", body = ErrorSchema)
    ),
    tags = ["recommendations"],
    operation_id = "saveRecommendationTabs"
)]
#[put("/students/{studentId}/recommendations")]
pub async fn save_tabs(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Vec<RecommendationTab>>,
) -> ApiResult<HttpResponse> {
    let student_id = parse_id(&path, STUDENT)?;
    state
        .recommendations
        .save_tabs(&student_id, payload.into_inner())
        .await?;
    Ok(no_content())
}

#[utoipa::path(
    delete,
    path = "/api/v1/students/{studentId}/recommendations/{tabId}",
    params(
        ("studentId" = String, Path, description = "Student identifier"),
        ("tabId" = String, Path, description = "Tab identifier")
    ),
    responses((status = 204, description = "Tab deleted")),
    tags = ["recommendations"],
    operation_id = "deleteRecommendationTab"
)]
#[delete("/students/{studentId}/recommendations/{tabId}")]
pub async fn delete_tab(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (student, tab) = path.into_inner();
    state
        .recommendations
        .delete_tab(
            &parse_id(&student, STUDENT)?,
            &parse_id(&tab, ParamName::new("tabId"))?,
        )
        .await?;
    Ok(no_content())
}
