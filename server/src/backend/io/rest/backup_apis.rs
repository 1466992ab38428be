//! # REST API for Database Backup
//!
//! The backup document is served as-is (camelCase field names) so it can be
//! restored later, here or in the browser version.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use shared::SuccessResponse;

use crate::backend::io::rest::access::AdminUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::ApiBytes;
use crate::backend::io::rest::{today, MAX_BACKUP_BYTES};
use crate::backend::AppState;

/// Create a router for backup APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/database", get(download_backup).put(restore_backup))
        .layer(DefaultBodyLimit::max(MAX_BACKUP_BYTES))
}

pub async fn download_backup(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> impl IntoResponse {
    info!("GET /api/admin/database - by {}", admin.id);

    match state.backup_service.export_database().await {
        Ok(backup) => {
            let disposition = format!(
                "attachment; filename=\"backup_familia_fin_{}.json\"",
                today().format("%Y-%m-%d")
            );
            (
                StatusCode::OK,
                [(header::CONTENT_DISPOSITION, disposition)],
                Json(backup),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to export database: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Overwrite the stored collections with an uploaded backup
pub async fn restore_backup(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiBytes(body): ApiBytes,
) -> impl IntoResponse {
    info!("PUT /api/admin/database - by {}, {} bytes", admin.id, body.len());

    match state.backup_service.overwrite_database_from_json(&body).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success_message: "Banco de dados restaurado com sucesso.".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to restore database: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
