use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a user inside the household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular family member
    Member,
    /// Household administrator (one per tenant at registration time)
    Admin,
    /// Owner of the software, sees subscription revenue across tenants
    SystemAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Admin => "admin",
            UserRole::SystemAdmin => "system_admin",
        }
    }
}

/// Subscription tier of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Free,
    Premium,
}

/// Closed set of expense categories.
///
/// The serialized values are the Portuguese labels shown to users; they are
/// also the enum values sent to the AI provider in the response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Mercado")]
    Mercado,
    #[serde(rename = "Lazer")]
    Lazer,
    #[serde(rename = "Contas Fixas")]
    ContasFixas,
    #[serde(rename = "Transporte")]
    Transporte,
    #[serde(rename = "Saúde")]
    Saude,
    #[serde(rename = "Educação")]
    Educacao,
    #[serde(rename = "Investimentos")]
    Investimentos,
    #[serde(rename = "Outros")]
    Outros,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Mercado,
        ExpenseCategory::Lazer,
        ExpenseCategory::ContasFixas,
        ExpenseCategory::Transporte,
        ExpenseCategory::Saude,
        ExpenseCategory::Educacao,
        ExpenseCategory::Investimentos,
        ExpenseCategory::Outros,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Mercado => "Mercado",
            ExpenseCategory::Lazer => "Lazer",
            ExpenseCategory::ContasFixas => "Contas Fixas",
            ExpenseCategory::Transporte => "Transporte",
            ExpenseCategory::Saude => "Saúde",
            ExpenseCategory::Educacao => "Educação",
            ExpenseCategory::Investimentos => "Investimentos",
            ExpenseCategory::Outros => "Outros",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ExpenseCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Categoria inválida: {}", wanted))
    }
}

/// Payment status of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Paid,
    Pending,
    Cancelled,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Paid => "paid",
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for ExpenseStatus {
    fn default() -> Self {
        ExpenseStatus::Paid
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(ExpenseStatus::Paid),
            "pending" => Ok(ExpenseStatus::Pending),
            "cancelled" => Ok(ExpenseStatus::Cancelled),
            other => Err(format!("Status inválido: {}", other)),
        }
    }
}

/// Granularity used to bucket expenses in the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    Day,
    Week,
    Month,
    Year,
}

impl GroupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::Day => "day",
            GroupMode::Week => "week",
            GroupMode::Month => "month",
            GroupMode::Year => "year",
        }
    }
}

impl Default for GroupMode {
    fn default() -> Self {
        GroupMode::Month
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Completed,
}

/// Kind of payload sent to the AI extraction adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionKind {
    /// Voice note describing a purchase
    Audio,
    /// Receipt, invoice or bill (image or PDF)
    Document,
}

// ---------------------------------------------------------------------------
// Users and authentication
// ---------------------------------------------------------------------------

/// Public view of a user; never carries the password
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub role: UserRole,
    pub plan: SubscriptionPlan,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email or CPF (formatting characters are ignored)
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub avatar: Option<String>,
    pub password_change: Option<PasswordChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Expenses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub location: String,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub status: ExpenseStatus,
    pub notes: Option<String>,
    pub attachment_name: Option<String>,
    /// Base64 payload of the attached receipt
    pub attachment_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub category: ExpenseCategory,
    /// Defaults to today when omitted
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ExpenseStatus,
    pub notes: Option<String>,
    pub attachment_name: Option<String>,
    pub attachment_data: Option<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(default, with = "rust_decimal::serde::float_option")]
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseStatusRequest {
    pub status: ExpenseStatus,
}

/// Filters of the expense list; every field is optional
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpenseListRequest {
    pub text: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub user_id: Option<String>,
    pub status: Option<ExpenseStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteExpensesResponse {
    pub deleted_count: usize,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseGroup {
    /// Sortable bucket key (YYYY, YYYY-MM or YYYY-MM-DD)
    pub key: String,
    /// Human-readable label in pt-BR
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<Expense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedHistoryResponse {
    pub mode: GroupMode,
    pub groups: Vec<ExpenseGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTotal {
    pub user_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    /// 1-12
    pub month: u32,
    /// Short pt-BR month name ("Jan", "Fev", ...)
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category: ExpenseCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub limit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent: Decimal,
    pub exceeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_month_total: Decimal,
    pub current_month_label: String,
    pub by_category: Vec<CategoryTotal>,
    pub by_user: Vec<UserTotal>,
    pub monthly: Vec<MonthTotal>,
    pub budgets: Vec<BudgetStatus>,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementReport {
    pub expenses: Vec<Expense>,
    /// Sum of every expense that is not cancelled
    #[serde(with = "rust_decimal::serde::float")]
    pub active_total: Decimal,
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSelectionRequest {
    pub expense_ids: Vec<String>,
    /// Only used to name the history CSV file
    #[serde(default)]
    pub group_mode: GroupMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFileResponse {
    pub filename: String,
    pub content_type: String,
    pub content: String,
    pub expense_count: usize,
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: ExpenseCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub limit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetListResponse {
    pub budgets: Vec<Budget>,
}

// ---------------------------------------------------------------------------
// System owner finance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemWithdrawal {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub method: String,
    pub destination: String,
    pub status: WithdrawalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWithdrawalRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// PIX key receiving the payout
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalListResponse {
    pub withdrawals: Vec<SystemWithdrawal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemFinanceOverview {
    pub subscriber_count: usize,
    pub total_users: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub subscription_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_withdrawn: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub available_balance: Decimal,
}

// ---------------------------------------------------------------------------
// AI extraction
// ---------------------------------------------------------------------------

/// Expense fields suggested by the AI provider, to be reviewed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub location: String,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub status: ExpenseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub draft: Option<ExpenseDraft>,
    pub message: String,
}
