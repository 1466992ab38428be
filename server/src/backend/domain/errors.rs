use thiserror::Error;

/// Business rule violations, carried inside `anyhow::Error` by the services.
///
/// Messages are shown to users as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("Credenciais inválidas. Verifique Email/CPF ou senha.")]
    InvalidCredentials,
    #[error("Sessão inválida ou expirada. Faça login novamente.")]
    Unauthenticated,
    #[error("Acesso negado.")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("Erro na inteligência artificial: {0}")]
    Extraction(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        DomainError::Duplicate(message.into())
    }
}

pub const USER_NOT_FOUND: &str = "Usuário não encontrado.";
pub const EXPENSE_NOT_FOUND: &str = "Despesa não encontrada.";
pub const EMPTY_SELECTION: &str = "Selecione pelo menos um item.";
