use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gasdepot_core::DomainError;
use gasdepot_store::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        StoreError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        StoreError::Domain(err @ DomainError::NotFound(_)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        StoreError::Storage { operation, message } => {
            // Details go to the logs, not to clients.
            tracing::error!(operation = %operation, message = %message, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "storage failure",
            )
        }
    }
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
