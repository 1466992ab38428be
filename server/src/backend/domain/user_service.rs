use anyhow::Result;
use log::info;
use shared::{SubscriptionPlan, UserRole};
use std::time::Duration;

use crate::backend::domain::commands::users::UpdateProfileCommand;
use crate::backend::domain::errors::{DomainError, USER_NOT_FOUND};
use crate::backend::domain::models::user::{digits_only, User, UserPatch};
use crate::backend::storage::{Connection, UserStorage};

const MIN_PASSWORD_LEN: usize = 3;

/// Profile edits, family member management and subscriptions
#[derive(Clone)]
pub struct UserService<C: Connection> {
    users: C::UserRepository,
    payment_delay: Duration,
}

impl<C: Connection> UserService<C> {
    pub fn new(connection: &C, payment_delay: Duration) -> Self {
        Self {
            users: connection.create_user_repository(),
            payment_delay,
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND).into())
    }

    /// List users, optionally filtered by a search term over name, email and CPF
    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
        let users = self.users.list_users().await?;
        Ok(match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => users.into_iter().filter(|u| matches_search(u, term)).collect(),
            None => users,
        })
    }

    /// Apply a profile edit of the user `user_id`
    pub async fn update_profile(&self, user_id: &str, command: UpdateProfileCommand) -> Result<User> {
        info!("Updating profile of user {}", user_id);

        let snapshot = self.users.list_users_versioned().await?;
        let current = snapshot
            .value
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        let mut patch = UserPatch {
            avatar: command.avatar,
            ..Default::default()
        };

        if let Some(name) = command.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("O nome é obrigatório.").into());
            }
            patch.name = Some(name);
        }

        if let Some(email) = command.email {
            let email = email.trim().to_string();
            if email.is_empty() {
                return Err(DomainError::validation("O email é obrigatório.").into());
            }
            let lower = email.to_lowercase();
            if snapshot
                .value
                .iter()
                .any(|u| u.id != user_id && u.email.to_lowercase() == lower)
            {
                return Err(
                    DomainError::duplicate("Este email já está em uso por outro usuário.").into(),
                );
            }
            patch.email = Some(email);
        }

        if let Some(cpf) = command.cpf {
            let cpf = digits_only(&cpf);
            if cpf.is_empty() {
                return Err(DomainError::validation("O CPF é obrigatório.").into());
            }
            if snapshot.value.iter().any(|u| u.id != user_id && u.cpf == cpf) {
                return Err(
                    DomainError::duplicate("Este CPF já está em uso por outro usuário.").into(),
                );
            }
            patch.cpf = Some(cpf);
        }

        if let Some(change) = command.password_change {
            if change.current_password.is_empty() {
                return Err(DomainError::validation("Confirme sua senha atual.").into());
            }
            if change.current_password != current.password {
                return Err(DomainError::validation("Senha atual incorreta.").into());
            }
            if change.new_password.chars().count() < MIN_PASSWORD_LEN {
                return Err(DomainError::validation(
                    "A nova senha deve ter pelo menos 3 caracteres.",
                )
                .into());
            }
            if change.new_password != change.confirm_password {
                return Err(DomainError::validation("As novas senhas não coincidem.").into());
            }
            patch.password = Some(change.new_password);
        }

        let updated = self
            .users
            .update_user(user_id, &patch, Some(snapshot.revision))
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        info!("Updated profile of user {}", user_id);
        Ok(updated)
    }

    /// Admin reset of another user's password
    pub async fn reset_password(&self, user_id: &str, new_password: &str) -> Result<User> {
        if new_password.is_empty() {
            return Err(DomainError::validation("A nova senha não pode ser vazia.").into());
        }
        let patch = UserPatch {
            password: Some(new_password.to_string()),
            ..Default::default()
        };
        let user = self
            .users
            .update_user(user_id, &patch, None)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        info!("Password of user {} was reset", user_id);
        Ok(user)
    }

    /// Delete a user; the only remaining admin cannot be deleted.
    ///
    /// Expenses of the deleted user are kept.
    pub async fn delete_user(&self, user_id: &str) -> Result<User> {
        let snapshot = self.users.list_users_versioned().await?;
        let user = snapshot
            .value
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        if user.is_admin() {
            let admin_count = snapshot.value.iter().filter(|u| u.is_admin()).count();
            if admin_count <= 1 {
                return Err(DomainError::validation(
                    "Não é possível excluir o único administrador do sistema.",
                )
                .into());
            }
        }

        self.users
            .delete_user(user_id, Some(snapshot.revision))
            .await?;
        info!("Deleted user {} ({})", user.id, user.name);
        Ok(user)
    }

    /// Simulated checkout: waits for the payment delay, then upgrades the plan
    pub async fn subscribe(&self, user_id: &str) -> Result<User> {
        // Fail fast before "charging"
        self.get_user(user_id).await?;

        if !self.payment_delay.is_zero() {
            tokio::time::sleep(self.payment_delay).await;
        }

        let patch = UserPatch {
            plan: Some(SubscriptionPlan::Premium),
            ..Default::default()
        };
        let user = self
            .users
            .update_user(user_id, &patch, None)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        info!("User {} subscribed to premium", user_id);
        Ok(user)
    }

    /// Premium subscribers, never including the system owner
    pub async fn list_subscribers(&self, search: Option<&str>) -> Result<Vec<User>> {
        let users = self.list_users(search).await?;
        Ok(users
            .into_iter()
            .filter(|u| u.plan == SubscriptionPlan::Premium && !u.is_system_admin())
            .collect())
    }
}

fn matches_search(user: &User, term: &str) -> bool {
    let lower = term.to_lowercase();
    user.name.to_lowercase().contains(&lower)
        || user.email.to_lowercase().contains(&lower)
        || user.cpf.contains(term)
}
