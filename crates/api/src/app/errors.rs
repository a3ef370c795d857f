use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use voltran_infra::LedgerError;

use crate::app::dto::number;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "message": message,
                "field": field,
            })),
        )
            .into_response(),
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Material not found"),
        LedgerError::InsufficientStock { available, unit } => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": format!("Insufficient stock. Available: {available} {unit}"),
                "available": number(available),
                "unit": unit,
            })),
        )
            .into_response(),
        LedgerError::Busy => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "busy",
            "material is busy, retry the request",
        ),
        LedgerError::Internal(detail) => {
            tracing::error!(%detail, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

/// Malformed or non-JSON request bodies.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
