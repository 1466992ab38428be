//! Login, self-registration and sessions.

use anyhow::{anyhow, Result};
use log::{info, warn};
use shared::{SubscriptionPlan, UserRole};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::backend::domain::commands::users::RegisterUserCommand;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::user::{digits_only, User};
use crate::backend::storage::{Connection, UserStorage};

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type SessionTable = HashMap<String, Session>;

/// Authenticates users and keeps the in-memory session table
#[derive(Clone)]
pub struct AuthService<C: Connection> {
    users: C::UserRepository,
    /// token -> session
    sessions: Arc<RwLock<SessionTable>>,
    session_ttl: Duration,
}

impl<C: Connection> AuthService<C> {
    pub fn new(connection: &C, session_ttl: Duration) -> Self {
        Self {
            users: connection.create_user_repository(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl,
        }
    }

    fn write_sessions(&self) -> Result<std::sync::RwLockWriteGuard<'_, SessionTable>> {
        self.sessions
            .write()
            .map_err(|_| anyhow!("session table lock poisoned"))
    }

    /// Find the user whose email or CPF matches `identifier` and whose
    /// password equals `password`
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<User> {
        let users = self.users.list_users().await?;
        users
            .into_iter()
            .find(|u| u.matches_identifier(identifier) && u.password == password)
            .ok_or_else(|| DomainError::InvalidCredentials.into())
    }

    /// Authenticate and open a session
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(String, User)> {
        let user = match self.authenticate(identifier, password).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Failed login for identifier {:?}", identifier);
                return Err(e);
            }
        };

        let token = Uuid::new_v4().to_string();
        let now = Instant::now();
        {
            let mut sessions = self.write_sessions()?;
            sessions.retain(|_, session| !session.is_expired(now));
            sessions.insert(
                token.clone(),
                Session {
                    user_id: user.id.clone(),
                    expires_at: now + self.session_ttl,
                },
            );
        }

        info!("User {} logged in", user.id);
        Ok((token, user))
    }

    /// Revoke a session; returns false if the token was unknown
    pub fn logout(&self, token: &str) -> Result<bool> {
        let removed = self.write_sessions()?.remove(token);
        if let Some(session) = &removed {
            info!("User {} logged out", session.user_id);
        }
        Ok(removed.is_some())
    }

    /// Revoke every session of `user_id` except `keep`; returns how many
    /// were revoked
    pub fn revoke_user(&self, user_id: &str, keep: Option<&str>) -> Result<usize> {
        let mut sessions = self.write_sessions()?;
        let before = sessions.len();
        sessions.retain(|token, session| session.user_id != user_id || Some(token.as_str()) == keep);
        let revoked = before - sessions.len();
        if revoked > 0 {
            info!("Revoked {} session(s) of user {}", revoked, user_id);
        }
        Ok(revoked)
    }

    /// Resolve a session token to the current user record.
    ///
    /// The user is re-read on every call; an expired session or one of a
    /// deleted user is revoked.
    pub async fn current_user(&self, token: &str) -> Result<User> {
        let session = self
            .sessions
            .read()
            .map_err(|_| anyhow!("session table lock poisoned"))?
            .get(token)
            .cloned()
            .ok_or(DomainError::Unauthenticated)?;

        if session.is_expired(Instant::now()) {
            self.logout(token)?;
            return Err(DomainError::Unauthenticated.into());
        }

        match self.users.get_user(&session.user_id).await? {
            Some(user) => Ok(user),
            None => {
                self.logout(token)?;
                Err(DomainError::Unauthenticated.into())
            }
        }
    }

    /// Register a new user.
    ///
    /// The first user registered while no admin exists becomes `admin`, every
    /// later one `member`.
    pub async fn register(&self, command: RegisterUserCommand) -> Result<User> {
        let name = command.name.trim().to_string();
        let email = command.email.trim().to_string();
        let cpf = digits_only(&command.cpf);

        if name.is_empty() {
            return Err(DomainError::validation("O nome é obrigatório.").into());
        }
        if email.is_empty() {
            return Err(DomainError::validation("O email é obrigatório.").into());
        }
        if cpf.is_empty() {
            return Err(DomainError::validation("O CPF é obrigatório.").into());
        }
        if command.password.is_empty() {
            return Err(DomainError::validation("A senha é obrigatória.").into());
        }

        let snapshot = self.users.list_users_versioned().await?;
        let users = &snapshot.value;

        let email_lower = email.to_lowercase();
        if users.iter().any(|u| u.email.to_lowercase() == email_lower) {
            return Err(DomainError::duplicate("Este email já está cadastrado.").into());
        }
        if users.iter().any(|u| u.cpf == cpf) {
            return Err(DomainError::duplicate("Este CPF já está cadastrado.").into());
        }

        let role = if users.iter().any(User::is_admin) {
            UserRole::Member
        } else {
            UserRole::Admin
        };

        let user = User {
            id: User::generate_id(),
            avatar: User::avatar_for(&name),
            name,
            email,
            cpf,
            password: command.password,
            role,
            plan: SubscriptionPlan::Free,
        };

        // Fails with a conflict if someone registered in between
        self.users.store_user(&user, Some(snapshot.revision)).await?;

        info!("Registered user {} as {}", user.id, user.role.as_str());
        Ok(user)
    }
}
