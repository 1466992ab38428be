//! Subscription revenue of the system owner and its PIX payouts.

use anyhow::Result;
use chrono::Utc;
use log::info;
use rust_decimal::Decimal;
use shared::SubscriptionPlan;
use std::time::Duration;

use crate::backend::domain::commands::finance::{FinanceOverview, WithdrawCommand};
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::user::User;
use crate::backend::domain::models::withdrawal::SystemWithdrawal;
use crate::backend::storage::{Connection, UserStorage, WithdrawalStorage};

#[derive(Clone)]
pub struct SystemFinanceService<C: Connection> {
    users: C::UserRepository,
    withdrawals: C::WithdrawalRepository,
    subscription_price: Decimal,
    withdrawal_delay: Duration,
}

impl<C: Connection> SystemFinanceService<C> {
    pub fn new(connection: &C, subscription_price: Decimal, withdrawal_delay: Duration) -> Self {
        Self {
            users: connection.create_user_repository(),
            withdrawals: connection.create_withdrawal_repository(),
            subscription_price,
            withdrawal_delay,
        }
    }

    pub async fn overview(&self) -> Result<FinanceOverview> {
        let users = self.users.list_users().await?;
        let withdrawals = self.withdrawals.list_withdrawals().await?;
        Ok(compute_overview(&users, &withdrawals, self.subscription_price))
    }

    /// Payout history, newest first
    pub async fn list_withdrawals(&self) -> Result<Vec<SystemWithdrawal>> {
        let mut withdrawals = self.withdrawals.list_withdrawals().await?;
        withdrawals.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(withdrawals)
    }

    /// Withdraw part of the available balance to a PIX key.
    ///
    /// The balance is checked against the ledger revision that gets written,
    /// so two concurrent withdrawals cannot both spend the same balance.
    pub async fn withdraw(&self, command: WithdrawCommand) -> Result<SystemWithdrawal> {
        if command.amount <= Decimal::ZERO {
            return Err(DomainError::validation("Digite um valor válido.").into());
        }

        let users = self.users.list_users().await?;
        let ledger = self.withdrawals.list_withdrawals_versioned().await?;
        let overview = compute_overview(&users, &ledger.value, self.subscription_price);
        if command.amount > overview.available_balance {
            return Err(DomainError::validation("Saldo insuficiente para este valor.").into());
        }

        let destination = command.destination.trim().to_string();
        if destination.is_empty() {
            return Err(DomainError::validation("Digite a chave PIX de destino.").into());
        }

        if !self.withdrawal_delay.is_zero() {
            tokio::time::sleep(self.withdrawal_delay).await;
        }

        let withdrawal = SystemWithdrawal::new_pix(command.amount, destination, Utc::now());
        self.withdrawals
            .store_withdrawal(&withdrawal, Some(ledger.revision))
            .await?;

        info!(
            "Withdrew {} to {} ({} left)",
            withdrawal.amount,
            withdrawal.destination,
            overview.available_balance - withdrawal.amount
        );
        Ok(withdrawal)
    }
}

fn is_paying(user: &User) -> bool {
    user.plan == SubscriptionPlan::Premium && !user.is_system_admin()
}

pub fn compute_overview(
    users: &[User],
    withdrawals: &[SystemWithdrawal],
    subscription_price: Decimal,
) -> FinanceOverview {
    let subscriber_count = users.iter().filter(|u| is_paying(u)).count();
    let total_users = users.iter().filter(|u| !u.is_system_admin()).count();
    let total_revenue = subscription_price * Decimal::from(subscriber_count);
    let total_withdrawn: Decimal = withdrawals.iter().map(|w| w.amount).sum();

    FinanceOverview {
        subscriber_count,
        total_users,
        subscription_price,
        total_revenue,
        total_withdrawn,
        available_balance: total_revenue - total_withdrawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::user_service::UserService;
    use crate::backend::storage::json::seeder::seed_demo_data;
    use crate::backend::storage::JsonConnection;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn seeded() -> (JsonConnection, SystemFinanceService<JsonConnection>) {
        let connection = JsonConnection::in_memory();
        seed_demo_data(&connection, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .await
            .unwrap();
        let service = SystemFinanceService::new(&connection, dec!(10.00), Duration::ZERO);
        (connection, service)
    }

    fn withdraw(amount: Decimal, destination: &str) -> WithdrawCommand {
        WithdrawCommand {
            amount,
            destination: destination.to_string(),
        }
    }

    fn validation_message(err: &anyhow::Error) -> String {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(message)) => message.clone(),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overview_excludes_system_owner() {
        let (_connection, service) = seeded().await;
        let overview = service.overview().await.unwrap();
        assert_eq!(overview.subscriber_count, 1);
        assert_eq!(overview.total_users, 3);
        assert_eq!(overview.total_revenue, dec!(10.00));
        assert_eq!(overview.available_balance, dec!(10.00));
    }

    #[tokio::test]
    async fn test_balance_follows_subscriptions_and_withdrawals() {
        let (connection, service) = seeded().await;
        let users = UserService::new(&connection, Duration::ZERO);
        users.subscribe("u2").await.unwrap();
        users.subscribe("u3").await.unwrap();

        service.withdraw(withdraw(dec!(12.5), " dono@pix.com ")).await.unwrap();
        let overview = service.overview().await.unwrap();
        assert_eq!(overview.subscriber_count, 3);
        assert_eq!(overview.total_withdrawn, dec!(12.5));
        assert_eq!(overview.available_balance, dec!(30.00) - dec!(12.5));

        let ledger = service.list_withdrawals().await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].method, "PIX");
        assert_eq!(ledger[0].destination, "dono@pix.com");
    }

    #[tokio::test]
    async fn test_withdraw_checks_in_order() {
        let (_connection, service) = seeded().await;

        let err = service.withdraw(withdraw(dec!(0), "")).await.unwrap_err();
        assert_eq!(validation_message(&err), "Digite um valor válido.");

        let err = service.withdraw(withdraw(dec!(10.01), "")).await.unwrap_err();
        assert_eq!(validation_message(&err), "Saldo insuficiente para este valor.");

        let err = service.withdraw(withdraw(dec!(10), "  ")).await.unwrap_err();
        assert_eq!(validation_message(&err), "Digite a chave PIX de destino.");

        assert!(service.list_withdrawals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_balance_can_only_be_withdrawn_once() {
        let (_connection, service) = seeded().await;
        service.withdraw(withdraw(dec!(10), "chave")).await.unwrap();
        let err = service.withdraw(withdraw(dec!(1), "chave")).await.unwrap_err();
        assert_eq!(validation_message(&err), "Saldo insuficiente para este valor.");
    }
}
