//! Domain-level command and query types.
//!
//! Services take and return these; the REST layer maps the public DTOs of the
//! `shared` crate to and from them.

pub mod users {
    /// Input for registering a user (self-registration or by an admin)
    #[derive(Debug, Clone)]
    pub struct RegisterUserCommand {
        pub name: String,
        pub email: String,
        pub cpf: String,
        pub password: String,
    }

    #[derive(Debug, Clone)]
    pub struct PasswordChangeCommand {
        pub current_password: String,
        pub new_password: String,
        pub confirm_password: String,
    }

    /// Profile edit of the signed-in user
    #[derive(Debug, Clone, Default)]
    pub struct UpdateProfileCommand {
        pub name: Option<String>,
        pub email: Option<String>,
        pub cpf: Option<String>,
        pub avatar: Option<String>,
        pub password_change: Option<PasswordChangeCommand>,
    }
}

pub mod expenses {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{ExpenseCategory, ExpenseStatus};

    use crate::backend::domain::models::expense::Expense;

    #[derive(Debug, Clone)]
    pub struct CreateExpenseCommand {
        pub amount: Decimal,
        pub description: String,
        pub location: String,
        pub category: ExpenseCategory,
        pub date: Option<NaiveDate>,
        pub status: ExpenseStatus,
        pub notes: Option<String>,
        pub attachment_name: Option<String>,
        pub attachment_data: Option<String>,
    }

    /// Filters of the expense list; `None` matches everything
    #[derive(Debug, Clone, Default)]
    pub struct ExpenseFilter {
        /// Case-insensitive match on description or location
        pub text: Option<String>,
        pub category: Option<ExpenseCategory>,
        pub user_id: Option<String>,
        pub status: Option<ExpenseStatus>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    impl ExpenseFilter {
        pub fn matches(&self, expense: &Expense) -> bool {
            if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                let needle = text.to_lowercase();
                if !expense.description.to_lowercase().contains(&needle)
                    && !expense.location.to_lowercase().contains(&needle)
                {
                    return false;
                }
            }
            if self.category.is_some_and(|c| c != expense.category) {
                return false;
            }
            if self.user_id.as_deref().is_some_and(|u| u != expense.user_id) {
                return false;
            }
            if self.status.is_some_and(|s| s != expense.status) {
                return false;
            }
            if self.start_date.is_some_and(|d| expense.date < d) {
                return false;
            }
            if self.end_date.is_some_and(|d| expense.date > d) {
                return false;
            }
            true
        }
    }

    #[derive(Debug, Clone)]
    pub struct ExpenseListResult {
        pub expenses: Vec<Expense>,
        pub total: Decimal,
    }
}

pub mod reports {
    use rust_decimal::Decimal;
    use shared::{ExpenseCategory, GroupMode};

    use crate::backend::domain::models::expense::Expense;

    /// One bucket of the grouped history
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpenseGroup {
        pub key: String,
        pub label: String,
        pub total: Decimal,
        pub items: Vec<Expense>,
    }

    #[derive(Debug, Clone)]
    pub struct GroupedHistory {
        pub mode: GroupMode,
        pub groups: Vec<ExpenseGroup>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct UserSpending {
        pub user_id: String,
        pub name: String,
        pub total: Decimal,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct MonthSpending {
        pub month: u32,
        pub name: String,
        pub total: Decimal,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct BudgetUsage {
        pub category: ExpenseCategory,
        pub limit: Decimal,
        pub spent: Decimal,
    }

    impl BudgetUsage {
        pub fn exceeded(&self) -> bool {
            self.spent > self.limit
        }
    }

    #[derive(Debug, Clone)]
    pub struct DashboardResult {
        pub total_spent: Decimal,
        pub current_month_total: Decimal,
        pub current_month_label: String,
        pub by_category: Vec<(ExpenseCategory, Decimal)>,
        pub by_user: Vec<UserSpending>,
        pub monthly: Vec<MonthSpending>,
        pub budgets: Vec<BudgetUsage>,
        pub alerts: Vec<String>,
    }

    #[derive(Debug, Clone)]
    pub struct ManagementReportResult {
        pub expenses: Vec<Expense>,
        pub active_total: Decimal,
    }
}

pub mod exports {
    /// A generated file ready to be downloaded
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExportFile {
        pub filename: String,
        pub content_type: String,
        pub content: String,
        pub expense_count: usize,
    }
}

pub mod finance {
    use rust_decimal::Decimal;

    #[derive(Debug, Clone, PartialEq)]
    pub struct FinanceOverview {
        pub subscriber_count: usize,
        pub total_users: usize,
        pub subscription_price: Decimal,
        pub total_revenue: Decimal,
        pub total_withdrawn: Decimal,
        pub available_balance: Decimal,
    }

    #[derive(Debug, Clone)]
    pub struct WithdrawCommand {
        pub amount: Decimal,
        pub destination: String,
    }
}

pub mod extraction {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{ExpenseCategory, ExpenseStatus};

    /// Expense fields read from a voice note or a receipt, reviewed by the
    /// user before being saved
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpenseDraft {
        pub amount: Decimal,
        pub description: String,
        pub location: String,
        pub category: ExpenseCategory,
        pub date: NaiveDate,
        pub status: ExpenseStatus,
    }
}
