use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use super::connection::{JsonConnection, USERS_KEY};
use crate::backend::domain::models::user::{User, UserPatch};
use crate::backend::storage::traits::{Revision, UserStorage, Versioned};

/// JSON-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    connection: JsonConnection,
}

impl UserRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.list_users_versioned().await?.value)
    }

    async fn list_users_versioned(&self) -> Result<Versioned<Vec<User>>> {
        let snapshot = self.connection.read_collection::<User>(USERS_KEY)?;
        debug!("Loaded {} users", snapshot.value.len());
        Ok(snapshot)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.list_users().await?;
        Ok(users.into_iter().find(|u| u.id == user_id))
    }

    async fn store_user(&self, user: &User, expected: Option<Revision>) -> Result<()> {
        self.connection
            .modify_expecting(USERS_KEY, expected, |users: &mut Vec<User>| {
                users.push(user.clone());
                Ok(())
            })?;
        info!("Stored user {} ({})", user.id, user.email);
        Ok(())
    }

    async fn update_user(
        &self,
        user_id: &str,
        patch: &UserPatch,
        expected: Option<Revision>,
    ) -> Result<Option<User>> {
        self.connection
            .modify_expecting(USERS_KEY, expected, |users: &mut Vec<User>| {
                Ok(users.iter_mut().find(|u| u.id == user_id).map(|user| {
                    user.apply(patch);
                    user.clone()
                }))
            })
    }

    async fn delete_user(&self, user_id: &str, expected: Option<Revision>) -> Result<bool> {
        let removed = self
            .connection
            .modify_expecting(USERS_KEY, expected, |users: &mut Vec<User>| {
                let before = users.len();
                users.retain(|u| u.id != user_id);
                Ok(users.len() != before)
            })?;
        if removed {
            info!("Deleted user {}", user_id);
        }
        Ok(removed)
    }

    async fn replace_all_users(&self, users: &[User]) -> Result<()> {
        self.connection.overwrite_collection(USERS_KEY, users)?;
        info!("Replaced user collection with {} users", users.len());
        Ok(())
    }
}
