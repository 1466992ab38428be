use crate::backend::domain::commands::expenses::{
    CreateExpenseCommand, ExpenseFilter, ExpenseListResult,
};
use crate::backend::domain::models::expense::{Expense as DomainExpense, ExpensePatch};
use shared::{
    CreateExpenseRequest, Expense as SharedExpense, ExpenseListRequest, ExpenseListResponse,
    UpdateExpenseRequest,
};

/// Mapper to convert between shared Expense DTOs and domain Expense models.
pub struct ExpenseMapper;

impl ExpenseMapper {
    pub fn to_dto(domain: DomainExpense) -> SharedExpense {
        SharedExpense {
            id: domain.id,
            user_id: domain.user_id,
            amount: domain.amount,
            description: domain.description,
            location: domain.location,
            category: domain.category,
            date: domain.date,
            status: domain.status,
            notes: domain.notes,
            attachment_name: domain.attachment_name,
            attachment_data: domain.attachment_data,
        }
    }

    pub fn to_dtos(domain: Vec<DomainExpense>) -> Vec<SharedExpense> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: CreateExpenseRequest) -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount: request.amount,
            description: request.description,
            location: request.location,
            category: request.category,
            date: request.date,
            status: request.status,
            notes: request.notes,
            attachment_name: request.attachment_name,
            attachment_data: request.attachment_data,
        }
    }

    pub fn to_patch(request: UpdateExpenseRequest) -> ExpensePatch {
        ExpensePatch {
            amount: request.amount,
            description: request.description,
            location: request.location,
            category: request.category,
            date: request.date,
            status: request.status,
            notes: request.notes,
            attachment_name: request.attachment_name,
            attachment_data: request.attachment_data,
        }
    }

    pub fn to_filter(request: ExpenseListRequest) -> ExpenseFilter {
        ExpenseFilter {
            text: request.text,
            category: request.category,
            user_id: request.user_id,
            status: request.status,
            start_date: request.start_date,
            end_date: request.end_date,
        }
    }

    pub fn to_list_response(result: ExpenseListResult) -> ExpenseListResponse {
        ExpenseListResponse {
            expenses: Self::to_dtos(result.expenses),
            total: result.total,
        }
    }
}
