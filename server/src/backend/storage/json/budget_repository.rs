use anyhow::Result;
use async_trait::async_trait;
use log::info;
use shared::ExpenseCategory;

use super::connection::{JsonConnection, BUDGETS_KEY};
use crate::backend::domain::models::budget::Budget;
use crate::backend::storage::traits::BudgetStorage;

/// JSON-backed budget repository
#[derive(Clone)]
pub struct BudgetRepository {
    connection: JsonConnection,
}

impl BudgetRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl BudgetStorage for BudgetRepository {
    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        Ok(self.connection.read_collection::<Budget>(BUDGETS_KEY)?.value)
    }

    async fn upsert_budget(&self, budget: &Budget) -> Result<()> {
        self.connection
            .modify(BUDGETS_KEY, |budgets: &mut Vec<Budget>| {
                match budgets.iter_mut().find(|b| b.category == budget.category) {
                    Some(existing) => existing.limit = budget.limit,
                    None => budgets.push(budget.clone()),
                }
                Ok(())
            })?;
        info!("Set budget for {} to {}", budget.category, budget.limit);
        Ok(())
    }

    async fn delete_budget(&self, category: ExpenseCategory) -> Result<bool> {
        self.connection
            .modify(BUDGETS_KEY, |budgets: &mut Vec<Budget>| {
                let before = budgets.len();
                budgets.retain(|b| b.category != category);
                Ok(budgets.len() != before)
            })
    }

    async fn replace_all_budgets(&self, budgets: &[Budget]) -> Result<()> {
        self.connection.overwrite_collection(BUDGETS_KEY, budgets)?;
        Ok(())
    }
}
