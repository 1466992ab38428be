use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{ExpenseCategory, ExpenseStatus};
use uuid::Uuid;

/// Domain model of an expense, as persisted under `famfin_expenses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_data: Option<String>,
}

impl Expense {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Cancelled expenses stay in history but don't count as spending
    pub fn is_active(&self) -> bool {
        self.status != ExpenseStatus::Cancelled
    }

    /// Merge a partial record into this expense.
    ///
    /// An empty `notes` string clears the notes.
    pub fn apply(&mut self, patch: &ExpensePatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = &patch.notes {
            self.notes = if notes.trim().is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
        if let Some(name) = &patch.attachment_name {
            self.attachment_name = Some(name.clone());
        }
        if let Some(data) = &patch.attachment_data {
            self.attachment_data = Some(data.clone());
        }
    }
}

/// Partial expense record; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<NaiveDate>,
    pub status: Option<ExpenseStatus>,
    pub notes: Option<String>,
    pub attachment_name: Option<String>,
    pub attachment_data: Option<String>,
}

impl ExpensePatch {
    pub fn status(status: ExpenseStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
