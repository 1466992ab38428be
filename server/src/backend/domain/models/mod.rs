pub mod budget;
pub mod expense;
pub mod user;
pub mod withdrawal;
