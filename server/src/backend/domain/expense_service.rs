use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use shared::ExpenseStatus;

use crate::backend::domain::commands::expenses::{
    CreateExpenseCommand, ExpenseFilter, ExpenseListResult,
};
use crate::backend::domain::errors::{DomainError, EXPENSE_NOT_FOUND};
use crate::backend::domain::models::expense::{Expense, ExpensePatch};
use crate::backend::storage::{Connection, ExpenseStorage};

/// Expense CRUD and the filtered expense list
#[derive(Clone)]
pub struct ExpenseService<C: Connection> {
    expenses: C::ExpenseRepository,
}

impl<C: Connection> ExpenseService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            expenses: connection.create_expense_repository(),
        }
    }

    /// Record an expense owned by `owner_id`; a missing date means `today`
    pub async fn add_expense(
        &self,
        owner_id: &str,
        command: CreateExpenseCommand,
        today: NaiveDate,
    ) -> Result<Expense> {
        validate_amount(command.amount)?;
        let description = command.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("A descrição é obrigatória.").into());
        }
        validate_attachment(command.attachment_name.as_deref(), command.attachment_data.as_deref())?;

        let expense = Expense {
            id: Expense::generate_id(),
            user_id: owner_id.to_string(),
            amount: command.amount,
            description,
            location: command.location.trim().to_string(),
            category: command.category,
            date: command.date.unwrap_or(today),
            status: command.status,
            notes: command.notes.filter(|n| !n.trim().is_empty()),
            attachment_name: command.attachment_name,
            attachment_data: command.attachment_data,
        };

        self.expenses.store_expense(&expense).await?;
        info!(
            "Added expense {} of {} in {} for user {}",
            expense.id, expense.amount, expense.category, owner_id
        );
        Ok(expense)
    }

    pub async fn get_expense(&self, expense_id: &str) -> Result<Expense> {
        self.expenses
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| DomainError::not_found(EXPENSE_NOT_FOUND).into())
    }

    /// Merge a partial record into an existing expense
    pub async fn update_expense(&self, expense_id: &str, patch: ExpensePatch) -> Result<Expense> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        if patch
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(DomainError::validation("A descrição é obrigatória.").into());
        }
        if let Some(data) = patch.attachment_data.as_deref() {
            let name = match patch.attachment_name.clone() {
                Some(name) => Some(name),
                None => self.get_expense(expense_id).await?.attachment_name,
            };
            validate_attachment(name.as_deref(), Some(data))?;
        }

        let updated = self
            .expenses
            .update_expense(expense_id, &patch)
            .await?
            .ok_or_else(|| DomainError::not_found(EXPENSE_NOT_FOUND))?;

        info!("Updated expense {}", expense_id);
        Ok(updated)
    }

    pub async fn update_status(&self, expense_id: &str, status: ExpenseStatus) -> Result<Expense> {
        let updated = self
            .expenses
            .update_expense(expense_id, &ExpensePatch::status(status))
            .await?
            .ok_or_else(|| DomainError::not_found(EXPENSE_NOT_FOUND))?;

        info!("Expense {} is now {}", expense_id, status);
        Ok(updated)
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<()> {
        if !self.expenses.delete_expense(expense_id).await? {
            return Err(DomainError::not_found(EXPENSE_NOT_FOUND).into());
        }
        info!("Deleted expense {}", expense_id);
        Ok(())
    }

    /// Remove every expense of the household; returns how many were removed
    pub async fn delete_all_expenses(&self) -> Result<usize> {
        self.expenses.delete_all_expenses().await
    }

    /// Expenses matching `filter`, newest first, with the sum of their amounts
    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<ExpenseListResult> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .list_expenses()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        sort_newest_first(&mut expenses);

        let total = expenses.iter().map(|e| e.amount).sum();
        Ok(ExpenseListResult { expenses, total })
    }

    pub async fn all_expenses(&self) -> Result<Vec<Expense>> {
        self.expenses.list_expenses().await
    }
}

/// Stable sort by date, newest first
pub fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("O valor deve ser maior que zero.").into());
    }
    Ok(())
}

fn validate_attachment(name: Option<&str>, data: Option<&str>) -> Result<()> {
    use base64::Engine;

    if let Some(data) = data {
        if name.map_or(true, |n| n.trim().is_empty()) {
            return Err(DomainError::validation("O anexo precisa de um nome de arquivo.").into());
        }
        if base64::engine::general_purpose::STANDARD.decode(data).is_err() {
            return Err(DomainError::validation("O anexo não está em base64 válido.").into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::json::seeder::seed_demo_data;
    use crate::backend::storage::JsonConnection;
    use rust_decimal_macros::dec;
    use shared::ExpenseCategory;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    async fn seeded() -> ExpenseService<JsonConnection> {
        let connection = JsonConnection::in_memory();
        seed_demo_data(&connection, today()).await.unwrap();
        ExpenseService::new(&connection)
    }

    fn command(amount: Decimal, description: &str) -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount,
            description: description.to_string(),
            location: " Padaria ".to_string(),
            category: ExpenseCategory::Mercado,
            date: None,
            status: ExpenseStatus::Paid,
            notes: Some("  ".to_string()),
            attachment_name: None,
            attachment_data: None,
        }
    }

    #[tokio::test]
    async fn test_add_defaults_date_to_today_and_trims() {
        let service = seeded().await;
        let expense = service
            .add_expense("u2", command(dec!(12.30), "Pão"), today())
            .await
            .unwrap();

        assert_eq!(expense.date, today());
        assert_eq!(expense.user_id, "u2");
        assert_eq!(expense.location, "Padaria");
        assert_eq!(expense.notes, None);
        assert_eq!(service.get_expense(&expense.id).await.unwrap(), expense);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_input() {
        let service = seeded().await;
        assert!(service
            .add_expense("u2", command(dec!(0), "Pão"), today())
            .await
            .is_err());
        assert!(service
            .add_expense("u2", command(dec!(5), "  "), today())
            .await
            .is_err());

        let mut bad_attachment = command(dec!(5), "Pão");
        bad_attachment.attachment_name = Some("nota.pdf".to_string());
        bad_attachment.attachment_data = Some("%%%".to_string());
        assert!(service.add_expense("u2", bad_attachment, today()).await.is_err());

        assert_eq!(service.all_expenses().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_update_status_and_patch() {
        let service = seeded().await;

        let cancelled = service
            .update_status("e1", ExpenseStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, ExpenseStatus::Cancelled);
        assert_eq!(cancelled.amount, dec!(450.50));

        let patched = service
            .update_expense(
                "e1",
                ExpensePatch {
                    location: Some("Atacadão".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.location, "Atacadão");
        assert_eq!(patched.status, ExpenseStatus::Cancelled);

        let err = service
            .update_status("missing", ExpenseStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_patch_attachment_is_validated() {
        let service = seeded().await;

        let err = service
            .update_expense(
                "e1",
                ExpensePatch {
                    attachment_name: Some("nota.png".to_string()),
                    attachment_data: Some("não é base64!".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Validation(_))));

        let err = service
            .update_expense(
                "e1",
                ExpensePatch {
                    attachment_data: Some("aGVsbG8=".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Validation(_))));

        let updated = service
            .update_expense(
                "e1",
                ExpensePatch {
                    attachment_name: Some("nota.png".to_string()),
                    attachment_data: Some("aGVsbG8=".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.attachment_name.as_deref(), Some("nota.png"));

        // the stored name covers a later data-only patch
        service
            .update_expense(
                "e1",
                ExpensePatch {
                    attachment_data: Some("b2xh".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_one_and_all() {
        let service = seeded().await;
        service.delete_expense("e2").await.unwrap();
        assert!(service.delete_expense("e2").await.is_err());
        assert_eq!(service.delete_all_expenses().await.unwrap(), 4);
        assert!(service.all_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts_newest_first() {
        let service = seeded().await;

        let all = service.list_expenses(&ExpenseFilter::default()).await.unwrap();
        let ids: Vec<&str> = all.expenses.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e4", "e2", "e5", "e3"]);
        assert_eq!(all.total, dec!(3416.40));

        let filter = ExpenseFilter {
            text: Some("UBER".to_string()),
            ..Default::default()
        };
        let found = service.list_expenses(&filter).await.unwrap();
        assert_eq!(found.expenses.len(), 1);
        assert_eq!(found.expenses[0].id, "e4");

        let filter = ExpenseFilter {
            user_id: Some("u2".to_string()),
            status: Some(ExpenseStatus::Paid),
            start_date: Some(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()),
            ..Default::default()
        };
        let found = service.list_expenses(&filter).await.unwrap();
        assert_eq!(found.expenses.len(), 1);
        assert_eq!(found.expenses[0].id, "e2");
    }
}
