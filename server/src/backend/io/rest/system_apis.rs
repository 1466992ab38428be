//! # REST API for the System Owner
//!
//! Subscription revenue, the subscriber list and PIX withdrawals. Every
//! route requires the `system_admin` role.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use shared::CreateWithdrawalRequest;

use crate::backend::io::rest::access::SystemAdminUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::{ApiJson, ApiQuery};
use crate::backend::io::rest::mappers::finance_mapper::FinanceMapper;
use crate::backend::io::rest::mappers::user_mapper::UserMapper;
use crate::backend::io::rest::user_apis::SearchQuery;
use crate::backend::AppState;

/// Create a router for system owner APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/finance", get(get_finance_overview))
        .route("/subscribers", get(list_subscribers))
        .route("/withdrawals", get(list_withdrawals).post(create_withdrawal))
}

pub async fn get_finance_overview(
    State(state): State<AppState>,
    SystemAdminUser(_owner): SystemAdminUser,
) -> impl IntoResponse {
    info!("GET /api/system/finance");

    match state.finance_service.overview().await {
        Ok(overview) => (StatusCode::OK, Json(FinanceMapper::to_overview_dto(overview))).into_response(),
        Err(e) => {
            error!("Failed to compute finance overview: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    SystemAdminUser(_owner): SystemAdminUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> impl IntoResponse {
    info!("GET /api/system/subscribers - search: {:?}", query.search);

    match state.user_service.list_subscribers(query.search.as_deref()).await {
        Ok(users) => (StatusCode::OK, Json(UserMapper::to_user_list(users))).into_response(),
        Err(e) => {
            error!("Failed to list subscribers: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    SystemAdminUser(_owner): SystemAdminUser,
) -> impl IntoResponse {
    info!("GET /api/system/withdrawals");

    match state.finance_service.list_withdrawals().await {
        Ok(withdrawals) => {
            (StatusCode::OK, Json(FinanceMapper::to_withdrawal_list(withdrawals))).into_response()
        }
        Err(e) => {
            error!("Failed to list withdrawals: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Withdraw from the available balance to a PIX key
pub async fn create_withdrawal(
    State(state): State<AppState>,
    SystemAdminUser(owner): SystemAdminUser,
    ApiJson(request): ApiJson<CreateWithdrawalRequest>,
) -> impl IntoResponse {
    info!("POST /api/system/withdrawals - {} by {}", request.amount, owner.id);

    match state
        .finance_service
        .withdraw(FinanceMapper::to_withdraw_command(request))
        .await
    {
        Ok(withdrawal) => {
            (StatusCode::CREATED, Json(FinanceMapper::to_withdrawal_dto(withdrawal))).into_response()
        }
        Err(e) => {
            error!("Withdrawal failed: {}", e);
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
    async fn test_household_admin_is_forbidden() {
        let app = TestApp::new().await;
        let admin = app.login("carlos@familia.com").await;
        let (status, _) = app.send("GET", "/api/system/finance", Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_owner_sees_revenue_and_withdraws() {
        let app = TestApp::new().await;
        let owner = app.login("dono@software.com").await;

        let (status, body) = app.send("GET", "/api/system/finance", Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscriber_count"], 1);
        assert_eq!(body["available_balance"], 10.0);

        let (_, body) = app.send("GET", "/api/system/subscribers", Some(&owner), None).await;
        assert_eq!(body["users"][0]["id"], "u1");

        let (status, body) = app
            .send(
                "POST",
                "/api/system/withdrawals",
                Some(&owner),
                Some(json!({ "amount": 50, "destination": "dono@pix.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["description"], "Saldo insuficiente para este valor.");

        let (status, body) = app
            .send(
                "POST",
                "/api/system/withdrawals",
                Some(&owner),
                Some(json!({ "amount": 4, "destination": "dono@pix.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["method"], "PIX");
        assert_eq!(body["status"], "completed");

        let (_, body) = app.send("GET", "/api/system/withdrawals", Some(&owner), None).await;
        assert_eq!(body["withdrawals"].as_array().unwrap().len(), 1);
        let (_, body) = app.send("GET", "/api/system/finance", Some(&owner), None).await;
        assert_eq!(body["available_balance"], 6.0);
    }
}
