use crate::backend::domain::models::budget::Budget as DomainBudget;
use shared::{Budget as SharedBudget, BudgetListResponse};

pub struct BudgetMapper;

impl BudgetMapper {
    pub fn to_dto(domain: DomainBudget) -> SharedBudget {
        SharedBudget {
            category: domain.category,
            limit: domain.limit,
        }
    }

    pub fn to_list_response(budgets: Vec<DomainBudget>) -> BudgetListResponse {
        BudgetListResponse {
            budgets: budgets.into_iter().map(Self::to_dto).collect(),
        }
    }
}
