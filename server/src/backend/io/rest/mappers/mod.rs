//! Conversions between the public DTOs of the `shared` crate and the domain
//! models and commands.

pub mod budget_mapper;
pub mod expense_mapper;
pub mod export_mapper;
pub mod extraction_mapper;
pub mod finance_mapper;
pub mod report_mapper;
pub mod user_mapper;
