//! # REST API for AI Extraction
//!
//! The request body is the raw file (voice note, photo or PDF) and its
//! `Content-Type` header is forwarded to the AI provider as the MIME type.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use log::{error, info};
use shared::ExtractionKind;

use crate::backend::io::rest::access::CurrentUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::ApiBytes;
use crate::backend::io::rest::mappers::extraction_mapper::ExtractionMapper;
use crate::backend::io::rest::{today, MAX_UPLOAD_BYTES};
use crate::backend::AppState;

/// Create a router for extraction APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audio", post(extract_from_audio))
        .route("/document", post(extract_from_document))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

pub async fn extract_from_audio(
    State(state): State<AppState>,
    session: CurrentUser,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> impl IntoResponse {
    extract(state, session, ExtractionKind::Audio, headers, body).await
}

pub async fn extract_from_document(
    State(state): State<AppState>,
    session: CurrentUser,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> impl IntoResponse {
    extract(state, session, ExtractionKind::Document, headers, body).await
}

async fn extract(
    state: AppState,
    session: CurrentUser,
    kind: ExtractionKind,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    info!(
        "POST /api/extract/{:?} - user: {}, {} bytes of {:?}",
        kind,
        session.user.id,
        body.len(),
        mime_type
    );

    match state
        .extraction_service
        .extract_draft(kind, mime_type, &body, today())
        .await
    {
        Ok(draft) => (StatusCode::OK, Json(ExtractionMapper::to_response(draft))).into_response(),
        Err(e) => {
            error!("Extraction failed: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::domain::extraction_service::RawExtraction;
    use crate::backend::test_support::{CannedExtractor, TestApp};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn upload(uri: &str, token: &str, content_type: Option<&str>, body: &'static [u8]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("X-Auth-Token", token);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_audio_draft_is_normalized() {
        let app = TestApp::with_extractor(Arc::new(CannedExtractor(Some(RawExtraction {
            amount: Some(dec!(42.5)),
            description: Some("Farmácia".to_string()),
            category: Some("Saúde".to_string()),
            ..Default::default()
        }))))
        .await;
        let token = app.login("ana@familia.com").await;

        let (status, body) = app
            .send_request(upload("/api/extract/audio", &token, None, b"audio"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["draft"]["amount"], 42.5);
        assert_eq!(body["draft"]["category"], "Saúde");
        assert_eq!(body["draft"]["status"], "paid");
        assert!(body["draft"]["date"].is_string());
    }

    #[tokio::test]
    async fn test_document_without_content_or_type() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;

        let (status, body) = app
            .send_request(upload("/api/extract/document", &token, Some("image/png"), b"png"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["draft"].is_null());

        let (status, _) = app
            .send_request(upload("/api/extract/document", &token, None, b"png"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
