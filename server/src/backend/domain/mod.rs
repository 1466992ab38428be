//! # Domain Module
//!
//! Business logic of the household expense tracker.
//!
//! Services are generic over the storage [`Connection`](crate::backend::storage::Connection)
//! and know nothing about HTTP. Every operation that depends on the current
//! date takes it as a parameter so results are reproducible in tests.
//!
//! ## Module Organization
//!
//! - **auth_service**: login by email or CPF, registration and sessions
//! - **user_service**: profile edits, family member management, subscriptions
//! - **expense_service**: expense CRUD and the filtered expense list
//! - **report_service**: grouped history, dashboard and management report
//! - **export_service**: CSV, JSON and printable HTML exports
//! - **budget_service**: monthly limits per category
//! - **system_finance_service**: subscription revenue and PIX withdrawals
//! - **backup_service**: full database backup and restore
//! - **extraction_service**: AI drafts from voice notes and receipts
//!
//! ## Business Rules
//!
//! - The first user registered without an admin present becomes admin
//! - The last admin can never be deleted
//! - Emails are unique ignoring case, CPFs are unique as digits
//! - Cancelled expenses never count towards dashboard totals or budgets

pub mod auth_service;
pub mod backup_service;
pub mod budget_service;
pub mod commands;
pub mod errors;
pub mod expense_service;
pub mod export_service;
pub mod extraction_service;
pub mod formatting;
pub mod models;
pub mod report_service;
pub mod system_finance_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use backup_service::{BackupService, DatabaseBackup};
pub use budget_service::BudgetService;
pub use errors::DomainError;
pub use expense_service::ExpenseService;
pub use export_service::ExportService;
pub use extraction_service::{ExpenseExtractor, ExtractionService, GeminiExtractor};
pub use report_service::ReportService;
pub use system_finance_service::SystemFinanceService;
pub use user_service::UserService;
