//! HTTP mapping of domain errors

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DomainError;

impl DomainError {
    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) | DomainError::InvalidFieldType(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::UniquenessViolation { .. } | DomainError::ReferentialIntegrity(_) => {
                StatusCode::CONFLICT
            }
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let DomainError::UniquenessViolation { constraint, .. } = &self {
            body["constraint"] = json!(constraint);
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for DomainError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::validation(rejection.body_text())
    }
}

/// `Json` body extractor whose rejections use the same error envelope as
/// every other failure.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(DomainError))]
pub struct ApiJson<T>(pub T);

/// `Query` extractor with the same error envelope.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(DomainError))]
pub struct ApiQuery<T>(pub T);
