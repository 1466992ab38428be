//! Translation of service errors into HTTP responses.
//!
//! Every failure leaves the API with the same body shape:
//! `{ "error": { "code": 409, "description": "..." } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use serde::{Deserialize, Serialize};

use crate::backend::domain::errors::DomainError;
use crate::backend::storage::StorageError;

const INTERNAL_ERROR: &str = "Erro interno do servidor. Tente novamente.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorInner,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInner {
    pub code: u16,
    pub description: String,
}

/// A request axum could not extract, with the status it deserves
#[derive(Debug, thiserror::Error)]
#[error("{description}")]
pub struct RejectedRequest {
    pub status: StatusCode,
    pub description: String,
}

/// Any error a handler can return
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_of(&self.0)
    }
}

pub fn status_of(err: &anyhow::Error) -> StatusCode {
    if let Some(rejected) = err.downcast_ref::<RejectedRequest>() {
        return rejected.status;
    }
    if let Some(domain) = err.downcast_ref::<DomainError>() {
        return match domain {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::InvalidCredentials | DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Duplicate(_) => StatusCode::CONFLICT,
            DomainError::Extraction(_) => StatusCode::BAD_GATEWAY,
        };
    }
    match err.downcast_ref::<StorageError>() {
        Some(StorageError::Conflict { .. }) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let description = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {:#}", self.0);
            INTERNAL_ERROR.to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: ErrorInner {
                code: status.as_u16(),
                description,
            },
        };
        (status, Json(body)).into_response()
    }
}
