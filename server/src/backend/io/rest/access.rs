//! Session and role guards.
//!
//! Handlers ask for one of the extractors below; the request is rejected
//! before the handler runs when the `X-Auth-Token` header is missing, the
//! session is unknown, or the user lacks the role.

use axum::{extract::FromRequestParts, http::request::Parts};
use log::warn;
use shared::UserRole;

use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::user::User;
use crate::backend::io::rest::error::ApiError;
use crate::backend::AppState;

pub const TOKEN_HEADER: &str = "X-Auth-Token";

/// Any signed-in user
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Household administrator
pub struct AdminUser(pub User);

/// Owner of the software
pub struct SystemAdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guard_impl(parts, state, None, |user, token| CurrentUser { user, token }).await
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guard_impl(parts, state, Some(UserRole::Admin), |user, _| AdminUser(user)).await
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SystemAdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guard_impl(parts, state, Some(UserRole::SystemAdmin), |user, _| SystemAdminUser(user)).await
    }
}

async fn guard_impl<R>(
    parts: &Parts,
    state: &AppState,
    required_role: Option<UserRole>,
    create_guard: impl FnOnce(User, String) -> R,
) -> Result<R, ApiError> {
    let token = parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(DomainError::Unauthenticated)?
        .to_string();

    let user = state.auth_service.current_user(&token).await?;

    if let Some(role) = required_role {
        if user.role != role {
            warn!(
                "User {} ({}) denied access to {} {}",
                user.id,
                user.role.as_str(),
                parts.method,
                parts.uri.path()
            );
            return Err(DomainError::Forbidden.into());
        }
    }

    Ok(create_guard(user, token))
}
