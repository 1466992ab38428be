use crate::backend::domain::commands::finance::{FinanceOverview, WithdrawCommand};
use crate::backend::domain::models::withdrawal::SystemWithdrawal as DomainWithdrawal;
use shared::{
    CreateWithdrawalRequest, SystemFinanceOverview, SystemWithdrawal as SharedWithdrawal,
    WithdrawalListResponse,
};

pub struct FinanceMapper;

impl FinanceMapper {
    pub fn to_overview_dto(overview: FinanceOverview) -> SystemFinanceOverview {
        SystemFinanceOverview {
            subscriber_count: overview.subscriber_count,
            total_users: overview.total_users,
            subscription_price: overview.subscription_price,
            total_revenue: overview.total_revenue,
            total_withdrawn: overview.total_withdrawn,
            available_balance: overview.available_balance,
        }
    }

    pub fn to_withdrawal_dto(domain: DomainWithdrawal) -> SharedWithdrawal {
        SharedWithdrawal {
            id: domain.id,
            amount: domain.amount,
            date: domain.date,
            method: domain.method,
            destination: domain.destination,
            status: domain.status,
        }
    }

    pub fn to_withdrawal_list(withdrawals: Vec<DomainWithdrawal>) -> WithdrawalListResponse {
        WithdrawalListResponse {
            withdrawals: withdrawals.into_iter().map(Self::to_withdrawal_dto).collect(),
        }
    }

    pub fn to_withdraw_command(request: CreateWithdrawalRequest) -> WithdrawCommand {
        WithdrawCommand {
            amount: request.amount,
            destination: request.destination,
        }
    }
}
