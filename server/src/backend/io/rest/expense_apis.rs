//! # REST API for Expenses
//!
//! Expenses are shared by the whole household: any signed-in member can list
//! and edit them, only the admin can wipe them all.

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use log::{error, info};
use shared::{
    CreateExpenseRequest, DeleteExpensesResponse, ExpenseListRequest, SuccessResponse,
    UpdateExpenseRequest, UpdateExpenseStatusRequest,
};

use crate::backend::io::rest::access::{AdminUser, CurrentUser};
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::{ApiJson, ApiQuery};
use crate::backend::io::rest::mappers::expense_mapper::ExpenseMapper;
use crate::backend::io::rest::{today, MAX_UPLOAD_BYTES};
use crate::backend::AppState;

/// Create a router for expense related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_expenses).post(create_expense).delete(delete_all_expenses),
        )
        .route("/:id", put(update_expense).delete(delete_expense))
        .route("/:id/status", put(update_expense_status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Filtered list, newest first, with the total of the listed amounts
pub async fn list_expenses(
    State(state): State<AppState>,
    _session: CurrentUser,
    ApiQuery(request): ApiQuery<ExpenseListRequest>,
) -> impl IntoResponse {
    info!("GET /api/expenses - filters: {:?}", request);

    match state.expense_service.list_expenses(&ExpenseMapper::to_filter(request)).await {
        Ok(result) => (StatusCode::OK, Json(ExpenseMapper::to_list_response(result))).into_response(),
        Err(e) => {
            error!("Failed to list expenses: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Record an expense owned by the signed-in user
pub async fn create_expense(
    State(state): State<AppState>,
    session: CurrentUser,
    ApiJson(request): ApiJson<CreateExpenseRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/expenses - user: {}, amount: {}, category: {}",
        session.user.id, request.amount, request.category
    );

    match state
        .expense_service
        .add_expense(&session.user.id, ExpenseMapper::to_create_command(request), today())
        .await
    {
        Ok(expense) => (StatusCode::CREATED, Json(ExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => {
            error!("Failed to create expense: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    _session: CurrentUser,
    Path(expense_id): Path<String>,
    ApiJson(request): ApiJson<UpdateExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{}", expense_id);

    match state
        .expense_service
        .update_expense(&expense_id, ExpenseMapper::to_patch(request))
        .await
    {
        Ok(expense) => (StatusCode::OK, Json(ExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => {
            error!("Failed to update expense {}: {}", expense_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_expense_status(
    State(state): State<AppState>,
    _session: CurrentUser,
    Path(expense_id): Path<String>,
    ApiJson(request): ApiJson<UpdateExpenseStatusRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{}/status - {}", expense_id, request.status);

    match state.expense_service.update_status(&expense_id, request.status).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => {
            error!("Failed to change status of {}: {}", expense_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    _session: CurrentUser,
    Path(expense_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", expense_id);

    match state.expense_service.delete_expense(&expense_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success_message: "Despesa excluída.".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete expense {}: {}", expense_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_all_expenses(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> impl IntoResponse {
    info!("DELETE /api/expenses - by {}", admin.id);

    match state.expense_service.delete_all_expenses().await {
        Ok(deleted_count) => {
            info!("Deleted all {} expenses", deleted_count);
            let response = DeleteExpensesResponse {
                deleted_count,
                success_message: format!("{} despesas excluídas.", deleted_count),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to delete all expenses: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
