use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use souk_core::DomainError;

/// API-boundary error. Domain outcomes map onto stable codes and statuses;
/// anything else is a 500 with no internal detail on the wire.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    Unauthorized(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Domain(err) => {
                let code = err.code();
                let status = match &err {
                    DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                    DomainError::InsufficientStock { .. } => StatusCode::CONFLICT,
                    DomainError::Storage(detail) => {
                        tracing::error!("storage failure: {detail}");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": { "code": code, "message": "internal server error" }
                            })),
                        )
                            .into_response();
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": { "code": code, "message": message }
        }));
        (status, body).into_response()
    }
}
