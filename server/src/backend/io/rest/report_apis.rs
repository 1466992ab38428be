//! # REST API for Reports
//!
//! Dashboard summary, grouped history and the management report.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;
use shared::GroupMode;

use crate::backend::io::rest::access::CurrentUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::ApiQuery;
use crate::backend::io::rest::mappers::report_mapper::ReportMapper;
use crate::backend::io::rest::today;
use crate::backend::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub group: GroupMode,
}

/// Create a router for report APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/history", get(get_history))
        .route("/management", get(get_management_report))
}

pub async fn get_dashboard(State(state): State<AppState>, _session: CurrentUser) -> impl IntoResponse {
    info!("GET /api/reports/dashboard");

    match state.report_service.dashboard(today()).await {
        Ok(result) => (StatusCode::OK, Json(ReportMapper::to_dashboard_dto(result))).into_response(),
        Err(e) => {
            error!("Failed to build dashboard: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Expenses bucketed by day, week, month or year
pub async fn get_history(
    State(state): State<AppState>,
    _session: CurrentUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> impl IntoResponse {
    info!("GET /api/reports/history - group: {}", query.group.as_str());

    match state.report_service.grouped_history(query.group).await {
        Ok(history) => (StatusCode::OK, Json(ReportMapper::to_history_dto(history))).into_response(),
        Err(e) => {
            error!("Failed to group history: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_management_report(
    State(state): State<AppState>,
    _session: CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/reports/management");

    match state.report_service.management_report().await {
        Ok(report) => (StatusCode::OK, Json(ReportMapper::to_management_dto(report))).into_response(),
        Err(e) => {
            error!("Failed to build management report: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_history_totals_match_expenses() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;

        for group in ["day", "week", "month", "year"] {
            let (status, body) = app
                .send("GET", &format!("/api/reports/history?group={}", group), Some(&token), None)
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["mode"], group);

            let groups = body["groups"].as_array().unwrap();
            let items: usize = groups.iter().map(|g| g["items"].as_array().unwrap().len()).sum();
            assert_eq!(items, 5);
            let cents: i64 = groups
                .iter()
                .map(|g| (g["total"].as_f64().unwrap() * 100.0).round() as i64)
                .sum();
            assert_eq!(cents, 341640);
        }
    }

    #[tokio::test]
    async fn test_history_defaults_to_month() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;
        let (status, body) = app.send("GET", "/api/reports/history", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "month");
    }

    #[tokio::test]
    async fn test_dashboard_and_management() {
        let app = TestApp::new().await;
        let token = app.login("pedro@familia.com").await;

        let (status, body) = app.send("GET", "/api/reports/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_spent"], 3416.4);
        assert_eq!(body["by_user"].as_array().unwrap().len(), 4);
        assert_eq!(body["budgets"].as_array().unwrap().len(), 2);

        let (status, body) = app.send("GET", "/api/reports/management", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expenses"][0]["id"], "e1");
        assert_eq!(body["active_total"], 3416.4);
    }

    #[tokio::test]
    async fn test_reports_require_session() {
        let app = TestApp::new().await;
        let (status, _) = app.send("GET", "/api/reports/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
