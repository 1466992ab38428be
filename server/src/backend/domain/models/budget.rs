use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::ExpenseCategory;

/// Monthly spending limit of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: ExpenseCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub limit: Decimal,
}
