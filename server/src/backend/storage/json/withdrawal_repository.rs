use anyhow::Result;
use async_trait::async_trait;
use log::info;

use super::connection::{JsonConnection, WITHDRAWALS_KEY};
use crate::backend::domain::models::withdrawal::SystemWithdrawal;
use crate::backend::storage::traits::{Revision, Versioned, WithdrawalStorage};

/// JSON-backed ledger of system withdrawals
#[derive(Clone)]
pub struct WithdrawalRepository {
    connection: JsonConnection,
}

impl WithdrawalRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl WithdrawalStorage for WithdrawalRepository {
    async fn list_withdrawals(&self) -> Result<Vec<SystemWithdrawal>> {
        Ok(self.list_withdrawals_versioned().await?.value)
    }

    async fn list_withdrawals_versioned(&self) -> Result<Versioned<Vec<SystemWithdrawal>>> {
        self.connection
            .read_collection::<SystemWithdrawal>(WITHDRAWALS_KEY)
    }

    async fn store_withdrawal(
        &self,
        withdrawal: &SystemWithdrawal,
        expected: Option<Revision>,
    ) -> Result<()> {
        self.connection.modify_expecting(
            WITHDRAWALS_KEY,
            expected,
            |withdrawals: &mut Vec<SystemWithdrawal>| {
                withdrawals.push(withdrawal.clone());
                Ok(())
            },
        )?;
        info!(
            "Recorded withdrawal {} of {} to {}",
            withdrawal.id, withdrawal.amount, withdrawal.destination
        );
        Ok(())
    }

    async fn replace_all_withdrawals(&self, withdrawals: &[SystemWithdrawal]) -> Result<()> {
        self.connection
            .overwrite_collection(WITHDRAWALS_KEY, withdrawals)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_ledger_appends() {
        let repo = WithdrawalRepository::new(JsonConnection::in_memory());
        let first = SystemWithdrawal::new_pix(dec!(10), "chave".to_string(), Utc::now());
        let second = SystemWithdrawal::new_pix(dec!(5), "chave".to_string(), Utc::now());

        repo.store_withdrawal(&first, None).await.unwrap();
        let seen = repo.list_withdrawals_versioned().await.unwrap();
        repo.store_withdrawal(&second, Some(seen.revision)).await.unwrap();

        // The revision seen before the second write is now stale
        assert!(repo.store_withdrawal(&first, Some(seen.revision)).await.is_err());
        assert_eq!(repo.list_withdrawals().await.unwrap().len(), 2);
    }
}
