use anyhow::Result;
use log::info;
use rust_decimal::Decimal;
use shared::ExpenseCategory;

use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::budget::Budget;
use crate::backend::storage::{BudgetStorage, Connection};

/// Monthly category limits
#[derive(Clone)]
pub struct BudgetService<C: Connection> {
    budgets: C::BudgetRepository,
}

impl<C: Connection> BudgetService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            budgets: connection.create_budget_repository(),
        }
    }

    /// Budgets in category order
    pub async fn list_budgets(&self) -> Result<Vec<Budget>> {
        let mut budgets = self.budgets.list_budgets().await?;
        budgets.sort_by_key(|b| b.category);
        Ok(budgets)
    }

    /// Set the limit of a category, creating its budget if needed
    pub async fn set_budget(&self, category: ExpenseCategory, limit: Decimal) -> Result<Budget> {
        if limit <= Decimal::ZERO {
            return Err(DomainError::validation("O limite deve ser maior que zero.").into());
        }
        let budget = Budget { category, limit };
        self.budgets.upsert_budget(&budget).await?;
        info!("Budget of {} set to {}", category, limit);
        Ok(budget)
    }

    pub async fn delete_budget(&self, category: ExpenseCategory) -> Result<()> {
        if !self.budgets.delete_budget(category).await? {
            return Err(DomainError::not_found("Orçamento não encontrado.").into());
        }
        info!("Budget of {} removed", category);
        Ok(())
    }
}
