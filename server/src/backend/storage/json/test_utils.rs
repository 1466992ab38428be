//! Test utilities with automatic cleanup of on-disk test data.
//!
//! The temporary directory is removed when the environment is dropped, even if
//! the test panics.

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::budget_repository::BudgetRepository;
use super::connection::JsonConnection;
use super::expense_repository::ExpenseRepository;
use super::user_repository::UserRepository;
use super::withdrawal_repository::WithdrawalRepository;

/// RAII test environment backed by a temporary data directory
pub struct TestEnvironment {
    /// Kept alive until drop
    _temp_dir: TempDir,
    pub connection: JsonConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::open(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    /// Same as [`new`](Self::new) with a recognizable directory prefix
    pub fn new_with_prefix(prefix: &str) -> Result<Self> {
        let temp_dir = TempDir::with_prefix(prefix)?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::open(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("FAMFIN_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}

/// All repositories over one test environment
pub struct RepositoryTestHelper {
    pub env: TestEnvironment,
    pub user_repo: UserRepository,
    pub expense_repo: ExpenseRepository,
    pub budget_repo: BudgetRepository,
    pub withdrawal_repo: WithdrawalRepository,
}

impl RepositoryTestHelper {
    pub fn new() -> Result<Self> {
        Self::from_env(TestEnvironment::new()?)
    }

    pub fn new_with_prefix(prefix: &str) -> Result<Self> {
        Self::from_env(TestEnvironment::new_with_prefix(prefix)?)
    }

    fn from_env(env: TestEnvironment) -> Result<Self> {
        Ok(RepositoryTestHelper {
            user_repo: UserRepository::new(env.connection.clone()),
            expense_repo: ExpenseRepository::new(env.connection.clone()),
            budget_repo: BudgetRepository::new(env.connection.clone()),
            withdrawal_repo: WithdrawalRepository::new(env.connection.clone()),
            env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::traits::ExpenseStorage;

    #[tokio::test]
    async fn test_environment_is_removed_on_drop() {
        let path = {
            let helper = RepositoryTestHelper::new_with_prefix("famfin_cleanup").unwrap();
            assert!(helper.expense_repo.list_expenses().await.unwrap().is_empty());
            helper.env.base_path.clone()
        };
        assert!(!path.exists());
    }
}
