//! JSON collection storage on top of a [`KeyValueStore`](super::key_value::KeyValueStore).

pub mod budget_repository;
pub mod connection;
pub mod expense_repository;
pub mod seeder;
pub mod user_repository;
pub mod withdrawal_repository;

#[cfg(test)]
pub mod test_utils;

pub use budget_repository::BudgetRepository;
pub use connection::JsonConnection;
pub use expense_repository::ExpenseRepository;
pub use user_repository::UserRepository;
pub use withdrawal_repository::WithdrawalRepository;
