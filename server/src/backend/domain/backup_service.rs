//! Whole-database backup and restore.
//!
//! The backup document keeps the field names of the browser version so its
//! backups restore here unchanged.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::budget::Budget;
use crate::backend::domain::models::expense::Expense;
use crate::backend::domain::models::user::User;
use crate::backend::domain::models::withdrawal::SystemWithdrawal;
use crate::backend::storage::{
    BudgetStorage, Connection, ExpenseStorage, UserStorage, WithdrawalStorage,
};

const INVALID_DATA: &str = "Dados inválidos para restauração.";
const MISSING_ARRAYS: &str =
    "Formato inválido: O JSON deve conter arrays de \"users\" e \"expenses\".";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseBackup {
    pub users: Vec<User>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
    pub withdrawals: Vec<SystemWithdrawal>,
    pub last_backup: DateTime<Utc>,
}

/// Parsed restore input; collections left out of the upload stay untouched
#[derive(Debug)]
struct RestorePlan {
    users: Vec<User>,
    expenses: Vec<Expense>,
    budgets: Option<Vec<Budget>>,
    withdrawals: Option<Vec<SystemWithdrawal>>,
}

#[derive(Clone)]
pub struct BackupService<C: Connection> {
    users: C::UserRepository,
    expenses: C::ExpenseRepository,
    budgets: C::BudgetRepository,
    withdrawals: C::WithdrawalRepository,
}

impl<C: Connection> BackupService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            users: connection.create_user_repository(),
            expenses: connection.create_expense_repository(),
            budgets: connection.create_budget_repository(),
            withdrawals: connection.create_withdrawal_repository(),
        }
    }

    pub async fn export_database(&self) -> Result<DatabaseBackup> {
        Ok(DatabaseBackup {
            users: self.users.list_users().await?,
            expenses: self.expenses.list_expenses().await?,
            budgets: self.budgets.list_budgets().await?,
            withdrawals: self.withdrawals.list_withdrawals().await?,
            last_backup: Utc::now(),
        })
    }

    /// Restore from an uploaded backup file
    pub async fn overwrite_database_from_json(&self, bytes: &[u8]) -> Result<()> {
        let data: Value = match serde_json::from_slice(bytes) {
            Ok(data) => data,
            Err(e) => {
                warn!("Rejected database restore, not JSON: {}", e);
                return Err(DomainError::validation(INVALID_DATA).into());
            }
        };
        self.overwrite_database(&data).await
    }

    /// Replace the stored collections with the content of `data`.
    ///
    /// Nothing is written unless the whole document is valid.
    pub async fn overwrite_database(&self, data: &Value) -> Result<()> {
        let plan = match parse_restore(data) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Rejected database restore: {}", e);
                return Err(e.into());
            }
        };

        self.users.replace_all_users(&plan.users).await?;
        self.expenses.replace_all_expenses(&plan.expenses).await?;
        if let Some(budgets) = &plan.budgets {
            self.budgets.replace_all_budgets(budgets).await?;
        }
        if let Some(withdrawals) = &plan.withdrawals {
            self.withdrawals.replace_all_withdrawals(withdrawals).await?;
        }

        info!(
            "Database restored: {} users, {} expenses",
            plan.users.len(),
            plan.expenses.len()
        );
        Ok(())
    }
}

fn parse_restore(data: &Value) -> Result<RestorePlan, DomainError> {
    let object = data
        .as_object()
        .ok_or_else(|| DomainError::validation(INVALID_DATA))?;

    let users = object.get("users").filter(|v| v.is_array());
    let expenses = object.get("expenses").filter(|v| v.is_array());
    let (Some(users), Some(expenses)) = (users, expenses) else {
        return Err(DomainError::validation(MISSING_ARRAYS));
    };

    Ok(RestorePlan {
        users: parse_records(users, "users")?,
        expenses: parse_records(expenses, "expenses")?,
        budgets: optional_records(object.get("budgets"), "budgets")?,
        withdrawals: optional_records(object.get("withdrawals"), "withdrawals")?,
    })
}

fn parse_records<T: DeserializeOwned>(value: &Value, field: &str) -> Result<Vec<T>, DomainError> {
    Vec::<T>::deserialize(value).map_err(|e| {
        DomainError::validation(format!("{} Registro inválido em \"{}\": {}", INVALID_DATA, field, e))
    })
}

fn optional_records<T: DeserializeOwned>(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<Vec<T>>, DomainError> {
    match value {
        Some(v) if v.is_array() => parse_records(v, field).map(Some),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(DomainError::validation(format!(
            "{} \"{}\" deve ser um array.",
            INVALID_DATA, field
        ))),
    }
}
