use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::WithdrawalStatus;
use uuid::Uuid;

pub const PIX_METHOD: &str = "PIX";

/// Payout of subscription revenue to the system owner
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

impl SystemWithdrawal {
    pub fn new_pix(amount: Decimal, destination: String, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount,
            date,
            method: PIX_METHOD.to_string(),
            destination,
            status: WithdrawalStatus::Completed,
        }
    }
}
