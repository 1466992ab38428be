//! Body and query extractors whose rejections use the API error body.
//!
//! Thin wrappers over axum's `Json`, `Query` and `Bytes`; a malformed body,
//! a wrong content type or an oversized upload is answered with
//! `{ "error": { "code", "description" } }` instead of axum's plain text.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use log::warn;
use serde::de::DeserializeOwned;

use crate::backend::io::rest::error::{ApiError, RejectedRequest};

pub const INVALID_BODY: &str = "Dados inválidos na requisição.";
pub const INVALID_QUERY: &str = "Parâmetros de consulta inválidos.";
pub const NOT_JSON: &str = "O corpo da requisição deve ser JSON.";
pub const TOO_LARGE: &str = "O conteúdo enviado é grande demais.";

/// JSON request body
pub struct ApiJson<T>(pub T);

/// URL query string
pub struct ApiQuery<T>(pub T);

/// Raw request body
pub struct ApiBytes(pub Bytes);

fn rejected(status: StatusCode, detail: String, fallback: &str) -> ApiError {
    warn!("Rejected request ({}): {}", status, detail);
    let description = match status {
        StatusCode::PAYLOAD_TOO_LARGE => TOO_LARGE,
        StatusCode::UNSUPPORTED_MEDIA_TYPE => NOT_JSON,
        _ => fallback,
    };
    // Anything that is not about size or media type is the caller's input
    let status = match status {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => status,
        _ => StatusCode::BAD_REQUEST,
    };
    ApiError::from(RejectedRequest {
        status,
        description: description.to_string(),
    })
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejected(rejection.status(), rejection.body_text(), INVALID_BODY)),
        }
    }
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(rejected(rejection.status(), rejection.body_text(), INVALID_QUERY)),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for ApiBytes
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Bytes::from_request(req, state).await {
            Ok(bytes) => Ok(ApiBytes(bytes)),
            Err(rejection) => Err(rejected(rejection.status(), rejection.body_text(), INVALID_BODY)),
        }
    }
}
