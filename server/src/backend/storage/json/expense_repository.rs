use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use super::connection::{JsonConnection, EXPENSES_KEY};
use crate::backend::domain::models::expense::{Expense, ExpensePatch};
use crate::backend::storage::traits::ExpenseStorage;

/// JSON-backed expense repository
#[derive(Clone)]
pub struct ExpenseRepository {
    connection: JsonConnection,
}

impl ExpenseRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ExpenseStorage for ExpenseRepository {
    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let snapshot = self.connection.read_collection::<Expense>(EXPENSES_KEY)?;
        debug!("Loaded {} expenses", snapshot.value.len());
        Ok(snapshot.value)
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>> {
        let expenses = self.list_expenses().await?;
        Ok(expenses.into_iter().find(|e| e.id == expense_id))
    }

    async fn store_expense(&self, expense: &Expense) -> Result<()> {
        self.connection
            .modify(EXPENSES_KEY, |expenses: &mut Vec<Expense>| {
                expenses.push(expense.clone());
                Ok(())
            })?;
        debug!("Stored expense {}", expense.id);
        Ok(())
    }

    async fn update_expense(&self, expense_id: &str, patch: &ExpensePatch) -> Result<Option<Expense>> {
        self.connection
            .modify(EXPENSES_KEY, |expenses: &mut Vec<Expense>| {
                Ok(expenses.iter_mut().find(|e| e.id == expense_id).map(|expense| {
                    expense.apply(patch);
                    expense.clone()
                }))
            })
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<bool> {
        self.connection
            .modify(EXPENSES_KEY, |expenses: &mut Vec<Expense>| {
                let before = expenses.len();
                expenses.retain(|e| e.id != expense_id);
                Ok(expenses.len() != before)
            })
    }

    async fn delete_all_expenses(&self) -> Result<usize> {
        let removed = self
            .connection
            .modify(EXPENSES_KEY, |expenses: &mut Vec<Expense>| {
                let count = expenses.len();
                expenses.clear();
                Ok(count)
            })?;
        info!("Deleted all {} expenses", removed);
        Ok(removed)
    }

    async fn replace_all_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.connection.overwrite_collection(EXPENSES_KEY, expenses)?;
        info!("Replaced expense collection with {} expenses", expenses.len());
        Ok(())
    }
}
