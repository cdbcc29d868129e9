//! OpenAPI schemas for domain types that stay free of framework derives.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "INVALID_REQUEST")]
    InvalidRequest,
    #[schema(rename = "MISSING_FIELDS")]
    MissingFields,
    #[schema(rename = "NOT_FOUND")]
    NotFound,
    #[schema(rename = "USER_NOT_FOUND")]
    UserNotFound,
    #[schema(rename = "NOTIFICATIONS_DISABLED")]
    NotificationsDisabled,
    #[schema(rename = "INVALID_TOKEN")]
    InvalidToken,
    #[schema(rename = "TOKEN_UNREGISTERED")]
    TokenUnregistered,
    #[schema(rename = "METHOD_NOT_ALLOWED")]
    MethodNotAllowed,
    #[schema(rename = "SERVICE_UNAVAILABLE")]
    ServiceUnavailable,
    #[schema(rename = "INTERNAL_ERROR")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "MISSING_FIELDS")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "missing required fields: title")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use utoipa::PartialSchema;

    use super::*;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_wire_codes() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in ["MISSING_FIELDS", "USER_NOT_FOUND", "TOKEN_UNREGISTERED"] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"));
    }
}
