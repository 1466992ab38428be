use crate::backend::domain::commands::reports::{
    DashboardResult, ExpenseGroup as DomainGroup, GroupedHistory, ManagementReportResult,
};
use crate::backend::io::rest::mappers::expense_mapper::ExpenseMapper;
use shared::{
    BudgetStatus, CategoryTotal, DashboardSummary, ExpenseGroup as SharedGroup,
    GroupedHistoryResponse, ManagementReport, MonthTotal, UserTotal,
};

/// Mapper from report results to their DTOs
pub struct ReportMapper;

impl ReportMapper {
    fn to_group_dto(group: DomainGroup) -> SharedGroup {
        SharedGroup {
            key: group.key,
            label: group.label,
            total: group.total,
            items: ExpenseMapper::to_dtos(group.items),
        }
    }

    pub fn to_history_dto(history: GroupedHistory) -> GroupedHistoryResponse {
        GroupedHistoryResponse {
            mode: history.mode,
            groups: history.groups.into_iter().map(Self::to_group_dto).collect(),
        }
    }

    pub fn to_dashboard_dto(result: DashboardResult) -> DashboardSummary {
        DashboardSummary {
            total_spent: result.total_spent,
            current_month_total: result.current_month_total,
            current_month_label: result.current_month_label,
            by_category: result
                .by_category
                .into_iter()
                .map(|(category, total)| CategoryTotal { category, total })
                .collect(),
            by_user: result
                .by_user
                .into_iter()
                .map(|u| UserTotal {
                    user_id: u.user_id,
                    name: u.name,
                    total: u.total,
                })
                .collect(),
            monthly: result
                .monthly
                .into_iter()
                .map(|m| MonthTotal {
                    month: m.month,
                    name: m.name,
                    total: m.total,
                })
                .collect(),
            budgets: result
                .budgets
                .into_iter()
                .map(|b| BudgetStatus {
                    exceeded: b.exceeded(),
                    category: b.category,
                    limit: b.limit,
                    spent: b.spent,
                })
                .collect(),
            alerts: result.alerts,
        }
    }

    pub fn to_management_dto(result: ManagementReportResult) -> ManagementReport {
        ManagementReport {
            expenses: ExpenseMapper::to_dtos(result.expenses),
            active_total: result.active_total,
        }
    }
}
