//! # REST API for Authentication
//!
//! Login by email or CPF, self-registration and logout.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use log::{error, info};
use shared::{LoginRequest, LoginResponse, RegisterUserRequest, SuccessResponse};

use crate::backend::io::rest::access::CurrentUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::user_mapper::UserMapper;
use crate::backend::AppState;

/// Create a router for authentication APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
}

/// Open a session
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/login - identifier: {}", request.identifier);

    match state.auth_service.login(&request.identifier, &request.password).await {
        Ok((token, user)) => {
            let response = LoginResponse {
                token,
                user: UserMapper::to_profile(user),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Self-registration; the account still has to log in afterwards
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/register - email: {}", request.email);

    match state.auth_service.register(UserMapper::to_register_command(request)).await {
        Ok(user) => (StatusCode::CREATED, Json(UserMapper::to_profile(user))).into_response(),
        Err(e) => {
            error!("Failed to register user: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, session: CurrentUser) -> impl IntoResponse {
    info!("POST /api/auth/logout - user: {}", session.user.id);

    match state.auth_service.logout(&session.token) {
        Ok(_) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success_message: "Sessão encerrada.".to_string(),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
