//! Small response bodies shared across handlers.

use actix_web::HttpResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DocumentId;

/// Identifier of a newly created document.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "Xk2v9QpL0aZ3mB7nT1cR")]
    pub id: String,
}

/// `201 Created` carrying the new identifier.
pub(crate) fn created(id: DocumentId) -> HttpResponse {
    HttpResponse::Created().json(CreatedResponse { id: id.to_string() })
}

pub(crate) fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
