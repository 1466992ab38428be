//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! Collections are small and always rewritten whole, so every mutating call is
//! a read-modify-write. Writes are guarded by a [`Revision`]: callers that
//! validated against a snapshot pass its revision back, and the write fails
//! with [`StorageError::Conflict`] if someone else changed the collection in
//! between.

use anyhow::Result;
use async_trait::async_trait;
use shared::ExpenseCategory;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::backend::domain::models::{
    budget::Budget,
    expense::{Expense, ExpensePatch},
    user::{User, UserPatch},
    withdrawal::SystemWithdrawal,
};

/// Fingerprint of the stored text of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision(u64);

impl Revision {
    /// Revision of a key that has never been written
    pub const ABSENT: Revision = Revision(0);

    pub fn of(raw: Option<&str>) -> Self {
        match raw {
            None => Self::ABSENT,
            Some(text) => {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                // Keep 0 reserved for absent keys
                Revision(hasher.finish() | 1)
            }
        }
    }
}

/// A value together with the revision it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub revision: Revision,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Os dados foram alterados por outra sessão ({key}). Recarregue e tente novamente.")]
    Conflict { key: String },
    #[error("Dados corrompidos em {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Trait defining the interface for user storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// List all users in storage order
    async fn list_users(&self) -> Result<Vec<User>>;

    /// List all users together with the collection revision
    async fn list_users_versioned(&self) -> Result<Versioned<Vec<User>>>;

    /// Retrieve a specific user by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Append a new user; `expected` guards against concurrent changes
    async fn store_user(&self, user: &User, expected: Option<Revision>) -> Result<()>;

    /// Merge a partial record into the user with the given ID.
    /// Returns the updated user, or `None` if it doesn't exist
    async fn update_user(
        &self,
        user_id: &str,
        patch: &UserPatch,
        expected: Option<Revision>,
    ) -> Result<Option<User>>;

    /// Remove a user; returns true if the user was found
    async fn delete_user(&self, user_id: &str, expected: Option<Revision>) -> Result<bool>;

    /// Replace the whole collection (database restore)
    async fn replace_all_users(&self, users: &[User]) -> Result<()>;
}

/// Trait defining the interface for expense storage operations
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    async fn list_expenses(&self) -> Result<Vec<Expense>>;

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>>;

    async fn store_expense(&self, expense: &Expense) -> Result<()>;

    /// Merge a partial record into the expense with the given ID
    async fn update_expense(&self, expense_id: &str, patch: &ExpensePatch) -> Result<Option<Expense>>;

    /// Returns true if the expense was found and deleted
    async fn delete_expense(&self, expense_id: &str) -> Result<bool>;

    /// Returns the number of expenses removed
    async fn delete_all_expenses(&self) -> Result<usize>;

    async fn replace_all_expenses(&self, expenses: &[Expense]) -> Result<()>;
}

/// Trait defining the interface for budget storage operations
#[async_trait]
pub trait BudgetStorage: Send + Sync {
    async fn list_budgets(&self) -> Result<Vec<Budget>>;

    /// Insert or replace the budget of a category
    async fn upsert_budget(&self, budget: &Budget) -> Result<()>;

    /// Returns true if a budget existed for the category
    async fn delete_budget(&self, category: ExpenseCategory) -> Result<bool>;

    async fn replace_all_budgets(&self, budgets: &[Budget]) -> Result<()>;
}

/// Trait defining the interface for the system withdrawal ledger
#[async_trait]
pub trait WithdrawalStorage: Send + Sync {
    async fn list_withdrawals(&self) -> Result<Vec<SystemWithdrawal>>;

    async fn list_withdrawals_versioned(&self) -> Result<Versioned<Vec<SystemWithdrawal>>>;

    async fn store_withdrawal(
        &self,
        withdrawal: &SystemWithdrawal,
        expected: Option<Revision>,
    ) -> Result<()>;

    async fn replace_all_withdrawals(&self, withdrawals: &[SystemWithdrawal]) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides factory
/// methods for creating repositories, so the domain layer works with any
/// storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    type UserRepository: UserStorage + Clone;
    type ExpenseRepository: ExpenseStorage + Clone;
    type BudgetRepository: BudgetStorage + Clone;
    type WithdrawalRepository: WithdrawalStorage + Clone;

    fn create_user_repository(&self) -> Self::UserRepository;

    fn create_expense_repository(&self) -> Self::ExpenseRepository;

    fn create_budget_repository(&self) -> Self::BudgetRepository;

    fn create_withdrawal_repository(&self) -> Self::WithdrawalRepository;
}
