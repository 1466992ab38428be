//! Demo data written on first run.
//!
//! Every collection is seeded independently and only if its key has never
//! been written, so an emptied collection stays empty.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{ExpenseCategory, ExpenseStatus, SubscriptionPlan, UserRole};

use super::connection::{JsonConnection, BUDGETS_KEY, EXPENSES_KEY, USERS_KEY, WITHDRAWALS_KEY};
use crate::backend::domain::models::{
    budget::Budget, expense::Expense, user::User, withdrawal::SystemWithdrawal,
};
use crate::backend::storage::traits::{Revision, StorageError};

pub async fn seed_demo_data(connection: &JsonConnection, today: NaiveDate) -> Result<()> {
    seed_collection(connection, USERS_KEY, &demo_users())?;
    seed_collection(connection, EXPENSES_KEY, &demo_expenses(today))?;
    seed_collection(connection, BUDGETS_KEY, &demo_budgets())?;
    seed_collection::<SystemWithdrawal>(connection, WITHDRAWALS_KEY, &[])?;
    Ok(())
}

fn seed_collection<T: Serialize>(connection: &JsonConnection, key: &str, items: &[T]) -> Result<()> {
    if connection.has_key(key)? {
        return Ok(());
    }
    match connection.write_collection(key, items, Revision::ABSENT) {
        Ok(_) => {
            info!("Seeded {} with {} records", key, items.len());
            Ok(())
        }
        // Someone else seeded it first
        Err(e) if matches!(e.downcast_ref::<StorageError>(), Some(StorageError::Conflict { .. })) => {
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn demo_user(
    id: &str,
    name: &str,
    email: &str,
    cpf: &str,
    role: UserRole,
    plan: SubscriptionPlan,
    avatar: &str,
) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        cpf: cpf.to_string(),
        password: "123".to_string(),
        role,
        plan,
        avatar: avatar.to_string(),
    }
}

fn demo_users() -> Vec<User> {
    vec![
        demo_user(
            "owner1",
            "Dono do Sistema",
            "dono@software.com",
            "00000000000",
            UserRole::SystemAdmin,
            SubscriptionPlan::Premium,
            "https://ui-avatars.com/api/?name=Dono+Sistema&background=0f172a&color=fff",
        ),
        demo_user(
            "u1",
            "Carlos (Pai)",
            "carlos@familia.com",
            "11122233344",
            UserRole::Admin,
            SubscriptionPlan::Premium,
            "https://picsum.photos/id/1005/100/100",
        ),
        demo_user(
            "u2",
            "Ana (Mãe)",
            "ana@familia.com",
            "22233344455",
            UserRole::Member,
            SubscriptionPlan::Free,
            "https://picsum.photos/id/1011/100/100",
        ),
        demo_user(
            "u3",
            "Pedro (Filho)",
            "pedro@familia.com",
            "33344455566",
            UserRole::Member,
            SubscriptionPlan::Free,
            "https://picsum.photos/id/1012/100/100",
        ),
    ]
}

fn demo_expenses(today: NaiveDate) -> Vec<Expense> {
    let expense = |id: &str,
                   user_id: &str,
                   cents: i64,
                   description: &str,
                   location: &str,
                   category: ExpenseCategory,
                   days_ago: i64,
                   status: ExpenseStatus| Expense {
        id: id.to_string(),
        user_id: user_id.to_string(),
        amount: Decimal::new(cents, 2),
        description: description.to_string(),
        location: location.to_string(),
        category,
        date: today - Duration::days(days_ago),
        status,
        notes: None,
        attachment_name: None,
        attachment_data: None,
    };

    vec![
        expense("e1", "u1", 45050, "Compras do Mês", "Carrefour", ExpenseCategory::Mercado, 0, ExpenseStatus::Paid),
        expense("e2", "u2", 12000, "Jantar Sábado", "Outback", ExpenseCategory::Lazer, 2, ExpenseStatus::Paid),
        expense("e3", "u1", 250000, "Aluguel", "Imobiliária", ExpenseCategory::ContasFixas, 5, ExpenseStatus::Pending),
        expense("e4", "u3", 4590, "Uber para Escola", "Uber", ExpenseCategory::Transporte, 1, ExpenseStatus::Paid),
        expense("e5", "u2", 30000, "Farmácia", "Droga Raia", ExpenseCategory::Saude, 3, ExpenseStatus::Paid),
    ]
}

fn demo_budgets() -> Vec<Budget> {
    vec![
        Budget {
            category: ExpenseCategory::Mercado,
            limit: Decimal::new(1500, 0),
        },
        Budget {
            category: ExpenseCategory::Lazer,
            limit: Decimal::new(500, 0),
        },
    ]
}
