//! # REST API for Data Export
//!
//! Exports come back as an [`shared::ExportFileResponse`]: the file name,
//! content type and text content. The client saves or prints it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};
use shared::{ExpenseListRequest, ExportSelectionRequest};

use crate::backend::io::rest::access::CurrentUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::{ApiJson, ApiQuery};
use crate::backend::io::rest::mappers::expense_mapper::ExpenseMapper;
use crate::backend::io::rest::mappers::export_mapper::ExportMapper;
use crate::backend::io::rest::today;
use crate::backend::AppState;

/// Create a router for export related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history.csv", post(export_history_csv))
        .route("/json", post(export_json))
        .route("/print", post(export_print_report))
        .route("/expenses.csv", get(export_expenses_csv))
}

/// Simple CSV of the selected history items
pub async fn export_history_csv(
    State(state): State<AppState>,
    _session: CurrentUser,
    ApiJson(request): ApiJson<ExportSelectionRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/export/history.csv - {} items, mode {}",
        request.expense_ids.len(),
        request.group_mode.as_str()
    );

    match state
        .export_service
        .export_history_csv(&request.expense_ids, request.group_mode, today())
        .await
    {
        Ok(file) => (StatusCode::OK, Json(ExportMapper::to_dto(file))).into_response(),
        Err(e) => {
            error!("Failed to export history CSV: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn export_json(
    State(state): State<AppState>,
    _session: CurrentUser,
    ApiJson(request): ApiJson<ExportSelectionRequest>,
) -> impl IntoResponse {
    info!("POST /api/export/json - {} items", request.expense_ids.len());

    match state.export_service.export_json(&request.expense_ids, today()).await {
        Ok(file) => (StatusCode::OK, Json(ExportMapper::to_dto(file))).into_response(),
        Err(e) => {
            error!("Failed to export JSON: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Printable HTML report of the selection
pub async fn export_print_report(
    State(state): State<AppState>,
    _session: CurrentUser,
    ApiJson(request): ApiJson<ExportSelectionRequest>,
) -> impl IntoResponse {
    info!("POST /api/export/print - {} items", request.expense_ids.len());

    match state
        .export_service
        .export_print_report(&request.expense_ids, today())
        .await
    {
        Ok(file) => (StatusCode::OK, Json(ExportMapper::to_dto(file))).into_response(),
        Err(e) => {
            error!("Failed to build print report: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Quoted CSV of the expense list, using the same filters as `GET /api/expenses`
pub async fn export_expenses_csv(
    State(state): State<AppState>,
    _session: CurrentUser,
    ApiQuery(request): ApiQuery<ExpenseListRequest>,
) -> impl IntoResponse {
    info!("GET /api/export/expenses.csv - filters: {:?}", request);

    match state
        .export_service
        .export_ledger_csv(&ExpenseMapper::to_filter(request), today())
        .await
    {
        Ok(file) => (StatusCode::OK, Json(ExportMapper::to_dto(file))).into_response(),
        Err(e) => {
            error!("Failed to export expenses CSV: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_history_csv_of_selection() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/export/history.csv",
                Some(&token),
                Some(json!({ "expense_ids": ["e1", "e2"], "group_mode": "year" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expense_count"], 2);
        assert!(body["filename"].as_str().unwrap().starts_with("relatorio_year_"));
        assert_eq!(body["content"].as_str().unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn test_empty_selection_is_bad_request() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;

        let (status, body) = app
            .send("POST", "/api/export/print", Some(&token), Some(json!({ "expense_ids": [] })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["description"], "Selecione pelo menos um item.");
    }

    #[tokio::test]
    async fn test_expenses_csv_follows_filters() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;

        let (status, body) = app
            .send("GET", "/api/export/expenses.csv?text=uber", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expense_count"], 1);
        let content = body["content"].as_str().unwrap();
        assert!(content.starts_with("\"Data\",\"Status\",\"Usuario\""));
        assert!(content.contains("\"Pedro (Filho)\""));
    }

    #[tokio::test]
    async fn test_json_and_print_exports() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;
        let selection = json!({ "expense_ids": ["e3"] });

        let (status, body) = app
            .send("POST", "/api/export/json", Some(&token), Some(selection.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content_type"], "application/json");

        let (status, body) = app
            .send("POST", "/api/export/print", Some(&token), Some(selection))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["content"].as_str().unwrap().contains("Total: R$ 2.500,00"));
    }
}
