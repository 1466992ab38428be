use crate::backend::domain::commands::extraction::ExpenseDraft as DomainDraft;
use shared::{ExpenseDraft as SharedDraft, ExtractionResponse};

pub struct ExtractionMapper;

impl ExtractionMapper {
    pub fn to_response(draft: Option<DomainDraft>) -> ExtractionResponse {
        let message = match &draft {
            Some(_) => "Dados extraídos! Revise antes de salvar.",
            None => "Não foi possível identificar uma despesa no arquivo.",
        };
        ExtractionResponse {
            draft: draft.map(|d| SharedDraft {
                amount: d.amount,
                description: d.description,
                location: d.location,
                category: d.category,
                date: d.date,
                status: d.status,
            }),
            message: message.to_string(),
        }
    }
}
