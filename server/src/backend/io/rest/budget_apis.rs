//! # REST API for Budgets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use log::{error, info};
use shared::{Budget, ExpenseCategory, SuccessResponse};

use crate::backend::domain::errors::DomainError;
use crate::backend::io::rest::access::{AdminUser, CurrentUser};
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::budget_mapper::BudgetMapper;
use crate::backend::AppState;

/// Create a router for budget APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_budgets).put(set_budget))
        .route("/:category", delete(delete_budget))
}

pub async fn list_budgets(State(state): State<AppState>, _session: CurrentUser) -> impl IntoResponse {
    info!("GET /api/budgets");

    match state.budget_service.list_budgets().await {
        Ok(budgets) => (StatusCode::OK, Json(BudgetMapper::to_list_response(budgets))).into_response(),
        Err(e) => {
            error!("Failed to list budgets: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Create or replace the limit of one category
pub async fn set_budget(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(request): ApiJson<Budget>,
) -> impl IntoResponse {
    info!("PUT /api/budgets - {} = {}", request.category, request.limit);

    match state.budget_service.set_budget(request.category, request.limit).await {
        Ok(budget) => (StatusCode::OK, Json(BudgetMapper::to_dto(budget))).into_response(),
        Err(e) => {
            error!("Failed to set budget: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_budget(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(category): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/budgets/{}", category);

    let category = match category.parse::<ExpenseCategory>() {
        Ok(category) => category,
        Err(message) => return ApiError::from(DomainError::validation(message)).into_response(),
    };

    match state.budget_service.delete_budget(category).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success_message: format!("Orçamento de {} removido.", category),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete budget {}: {}", category, e);
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
    async fn test_members_read_admins_write() {
        let app = TestApp::new().await;
        let member = app.login("ana@familia.com").await;
        let admin = app.login("carlos@familia.com").await;

        let (status, body) = app.send("GET", "/api/budgets", Some(&member), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["budgets"].as_array().unwrap().len(), 2);

        let budget = json!({ "category": "Saúde", "limit": 400 });
        let (status, _) = app.send("PUT", "/api/budgets", Some(&member), Some(budget.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send("PUT", "/api/budgets", Some(&admin), Some(budget)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["limit"], 400.0);

        let (_, body) = app.send("GET", "/api/budgets", Some(&member), None).await;
        assert_eq!(body["budgets"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_by_label() {
        let app = TestApp::new().await;
        let admin = app.login("carlos@familia.com").await;

        let (status, _) = app.send("DELETE", "/api/budgets/Lazer", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.send("DELETE", "/api/budgets/Lazer", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send("DELETE", "/api/budgets/Viagem", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
