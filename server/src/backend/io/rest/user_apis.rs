//! # REST API for Users
//!
//! The signed-in user's profile and subscription (`/me`), and family member
//! management for the household admin (`/users`).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use log::{error, info};
use serde::Deserialize;
use shared::{RegisterUserRequest, ResetPasswordRequest, SuccessResponse, UpdateProfileRequest};

use crate::backend::io::rest::access::{AdminUser, CurrentUser};
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::extract::{ApiJson, ApiQuery};
use crate::backend::io::rest::mappers::user_mapper::UserMapper;
use crate::backend::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Create a router for user related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/me/subscription", post(subscribe))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id/password", put(reset_password))
        .route("/users/:id", delete(delete_user))
}

pub async fn get_profile(session: CurrentUser) -> impl IntoResponse {
    info!("GET /api/me - user: {}", session.user.id);
    (StatusCode::OK, Json(UserMapper::to_profile(session.user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    session: CurrentUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> impl IntoResponse {
    info!("PUT /api/me - user: {}", session.user.id);
    let changes_password = request.password_change.is_some();

    match state
        .user_service
        .update_profile(&session.user.id, UserMapper::to_update_command(request))
        .await
    {
        Ok(user) => {
            // Other devices must sign in again with the new password
            if changes_password {
                if let Err(e) = state.auth_service.revoke_user(&user.id, Some(&session.token)) {
                    return ApiError::from(e).into_response();
                }
            }
            (StatusCode::OK, Json(UserMapper::to_profile(user))).into_response()
        }
        Err(e) => {
            error!("Failed to update profile of {}: {}", session.user.id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Simulated checkout of the premium plan
pub async fn subscribe(State(state): State<AppState>, session: CurrentUser) -> impl IntoResponse {
    info!("POST /api/me/subscription - user: {}", session.user.id);

    match state.user_service.subscribe(&session.user.id).await {
        Ok(user) => (StatusCode::OK, Json(UserMapper::to_profile(user))).into_response(),
        Err(e) => {
            error!("Failed to subscribe {}: {}", session.user.id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> impl IntoResponse {
    info!("GET /api/users - search: {:?}", query.search);

    match state.user_service.list_users(query.search.as_deref()).await {
        Ok(users) => (StatusCode::OK, Json(UserMapper::to_user_list(users))).into_response(),
        Err(e) => {
            error!("Failed to list users: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Register a family member on behalf of the admin
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - by {}: {}", admin.id, request.email);

    match state.auth_service.register(UserMapper::to_register_command(request)).await {
        Ok(user) => (StatusCode::CREATED, Json(UserMapper::to_profile(user))).into_response(),
        Err(e) => {
            error!("Failed to create user: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn reset_password(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/{}/password - by {}", user_id, admin.id);

    match state.user_service.reset_password(&user_id, &request.new_password).await {
        Ok(user) => {
            if let Err(e) = state.auth_service.revoke_user(&user.id, None) {
                return ApiError::from(e).into_response();
            }
            (
                StatusCode::OK,
                Json(SuccessResponse {
                    success_message: format!("Senha de {} alterada com sucesso.", user.name),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to reset password of {}: {}", user_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/users/{} - by {}", user_id, admin.id);

    match state.user_service.delete_user(&user_id).await {
        Ok(user) => {
            if let Err(e) = state.auth_service.revoke_user(&user.id, None) {
                return ApiError::from(e).into_response();
            }
            (
                StatusCode::OK,
                Json(SuccessResponse {
                    success_message: format!("Usuário {} removido.", user.name),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to delete user {}: {}", user_id, e);
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
    async fn test_member_cannot_manage_users() {
        let app = TestApp::new().await;
        let token = app.login("ana@familia.com").await;

        let (status, body) = app.send("GET", "/api/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["description"], "Acesso negado.");

        let (status, _) = app.send("DELETE", "/api/users/u3", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = TestApp::new().await;
        let (status, _) = app.send("GET", "/api/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.send("GET", "/api/me", Some("not-a-session"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_lists_searches_and_deletes() {
        let app = TestApp::new().await;
        let token = app.login("carlos@familia.com").await;

        let (status, body) = app.send("GET", "/api/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 4);

        let (_, body) = app.send("GET", "/api/users?search=pedro", Some(&token), None).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 1);

        let (status, body) = app.send("DELETE", "/api/users/u1", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["description"],
            "Não é possível excluir o único administrador do sistema."
        );

        let (status, _) = app.send("DELETE", "/api/users/u3", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.send("DELETE", "/api/users/u3", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleted_user_loses_session() {
        let app = TestApp::new().await;
        let admin = app.login("carlos@familia.com").await;
        let member = app.login("pedro@familia.com").await;

        app.send("DELETE", "/api/users/u3", Some(&admin), None).await;
        let (status, _) = app.send("GET", "/api/me", Some(&member), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_update_and_password_reset() {
        let app = TestApp::new().await;
        let admin = app.login("carlos@familia.com").await;
        let member = app.login("ana@familia.com").await;
        let other_device = app.login("ana@familia.com").await;

        let (status, body) = app
            .send(
                "PUT",
                "/api/me",
                Some(&member),
                Some(json!({
                    "name": "Ana Souza",
                    "password_change": {
                        "current_password": "123",
                        "new_password": "nova1",
                        "confirm_password": "nova1"
                    }
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ana Souza");

        // changing the password keeps only the session that changed it
        let (status, _) = app.send("GET", "/api/me", Some(&member), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.send("GET", "/api/me", Some(&other_device), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send(
                "PUT",
                "/api/users/u2/password",
                Some(&admin),
                Some(json!({ "new_password": "123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        // an admin reset signs the user out everywhere
        let (status, _) = app.send("GET", "/api/me", Some(&member), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.send("GET", "/api/me", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        app.login("ana@familia.com").await;
    }

    #[tokio::test]
    async fn test_subscription_upgrades_plan() {
        let app = TestApp::new().await;
        let token = app.login("pedro@familia.com").await;

        let (status, body) = app
            .send("POST", "/api/me/subscription", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"], "premium");
    }
}
