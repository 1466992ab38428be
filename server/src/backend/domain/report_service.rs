//! Grouped history, dashboard and management report.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use log::info;
use rust_decimal::Decimal;
use shared::{ExpenseCategory, GroupMode};
use std::collections::{BTreeMap, HashMap};

use crate::backend::domain::commands::reports::{
    BudgetUsage, DashboardResult, ExpenseGroup, GroupedHistory, ManagementReportResult,
    MonthSpending, UserSpending,
};
use crate::backend::domain::expense_service::sort_newest_first;
use crate::backend::domain::formatting::{
    day_label, fixed2, format_date_br, month_label, short_month_name, week_start,
};
use crate::backend::domain::models::expense::Expense;
use crate::backend::storage::{BudgetStorage, Connection, ExpenseStorage, UserStorage};

/// Bucket `expenses` by `mode`.
///
/// Items inside a bucket are newest first and buckets are ordered by key,
/// descending. Totals include every status, so the bucket totals always add
/// up to the sum of the input.
pub fn group_expenses(expenses: &[Expense], mode: GroupMode) -> Vec<ExpenseGroup> {
    let mut sorted = expenses.to_vec();
    sort_newest_first(&mut sorted);

    let mut groups: BTreeMap<String, ExpenseGroup> = BTreeMap::new();
    for expense in sorted {
        let (key, label) = bucket_of(expense.date, mode);
        let group = groups.entry(key.clone()).or_insert_with(|| ExpenseGroup {
            key,
            label,
            total: Decimal::ZERO,
            items: Vec::new(),
        });
        group.total += expense.amount;
        group.items.push(expense);
    }

    groups.into_values().rev().collect()
}

fn bucket_of(date: NaiveDate, mode: GroupMode) -> (String, String) {
    match mode {
        GroupMode::Day => (date.format("%Y-%m-%d").to_string(), day_label(date)),
        GroupMode::Week => {
            let start = week_start(date);
            (
                start.format("%Y-%m-%d").to_string(),
                format!("Semana de {}", format_date_br(start)),
            )
        }
        GroupMode::Month => (date.format("%Y-%m").to_string(), month_label(date)),
        GroupMode::Year => {
            let year = date.year().to_string();
            (year.clone(), year)
        }
    }
}

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    expenses: C::ExpenseRepository,
    users: C::UserRepository,
    budgets: C::BudgetRepository,
}

impl<C: Connection> ReportService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            expenses: connection.create_expense_repository(),
            users: connection.create_user_repository(),
            budgets: connection.create_budget_repository(),
        }
    }

    /// Every expense grouped by `mode`
    pub async fn grouped_history(&self, mode: GroupMode) -> Result<GroupedHistory> {
        let expenses = self.expenses.list_expenses().await?;
        let groups = group_expenses(&expenses, mode);
        info!("Grouped {} expenses into {} {} buckets", expenses.len(), groups.len(), mode.as_str());
        Ok(GroupedHistory { mode, groups })
    }

    /// Dashboard figures; cancelled expenses are ignored throughout
    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardResult> {
        let expenses = self.expenses.list_expenses().await?;
        let users = self.users.list_users().await?;
        let budgets = self.budgets.list_budgets().await?;

        let active: Vec<&Expense> = expenses.iter().filter(|e| e.is_active()).collect();

        let total_spent: Decimal = active.iter().map(|e| e.amount).sum();
        let current_month_total: Decimal = active
            .iter()
            .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
            .map(|e| e.amount)
            .sum();

        let mut per_category: BTreeMap<ExpenseCategory, Decimal> = BTreeMap::new();
        for expense in &active {
            *per_category.entry(expense.category).or_default() += expense.amount;
        }

        let mut per_user: HashMap<&str, Decimal> = HashMap::new();
        for expense in &active {
            *per_user.entry(expense.user_id.as_str()).or_default() += expense.amount;
        }
        let by_user = users
            .iter()
            .map(|u| UserSpending {
                user_id: u.id.clone(),
                name: u.first_name().to_string(),
                total: per_user.get(u.id.as_str()).copied().unwrap_or_default(),
            })
            .collect();

        let mut per_month: BTreeMap<u32, Decimal> = BTreeMap::new();
        for expense in active.iter().filter(|e| e.date.year() == today.year()) {
            *per_month.entry(expense.date.month()).or_default() += expense.amount;
        }
        let monthly = per_month
            .into_iter()
            .filter(|(_, total)| *total > Decimal::ZERO)
            .map(|(month, total)| MonthSpending {
                month,
                name: short_month_name(month).to_string(),
                total,
            })
            .collect();

        let budgets: Vec<BudgetUsage> = budgets
            .into_iter()
            .map(|b| BudgetUsage {
                category: b.category,
                limit: b.limit,
                spent: per_category.get(&b.category).copied().unwrap_or_default(),
            })
            .collect();

        let alerts = budgets
            .iter()
            .filter(|b| b.exceeded())
            .map(|b| {
                format!(
                    "Limite excedido em {}: R$ {} / R$ {}",
                    b.category,
                    fixed2(b.spent),
                    fixed2(b.limit)
                )
            })
            .collect();

        Ok(DashboardResult {
            total_spent,
            current_month_total,
            current_month_label: short_month_name(today.month()).to_string(),
            by_category: per_category.into_iter().collect(),
            by_user,
            monthly,
            budgets,
            alerts,
        })
    }

    /// All expenses newest first, with the total of the non-cancelled ones
    pub async fn management_report(&self) -> Result<ManagementReportResult> {
        let mut expenses = self.expenses.list_expenses().await?;
        sort_newest_first(&mut expenses);
        let active_total = expenses
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.amount)
            .sum();
        Ok(ManagementReportResult {
            expenses,
            active_total,
        })
    }
}
