//! AI-assisted expense entry.
//!
//! A voice note or a receipt (image or PDF) is sent to the Gemini
//! `generateContent` endpoint, which answers with a JSON expense constrained
//! by a response schema. The parsed answer becomes an [`ExpenseDraft`] the
//! user reviews before saving.

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{ExpenseCategory, ExpenseStatus, ExtractionKind};
use std::sync::Arc;

use crate::backend::domain::commands::extraction::ExpenseDraft;
use crate::backend::domain::errors::DomainError;

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// Fields as returned by the model; anything may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawExtraction {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Turns an uploaded payload into expense fields
#[async_trait]
pub trait ExpenseExtractor: Send + Sync {
    /// `Ok(None)` when the provider answered without any content
    async fn extract(
        &self,
        kind: ExtractionKind,
        mime_type: &str,
        data: &[u8],
        today: NaiveDate,
    ) -> Result<Option<RawExtraction>>;
}

/// Google Gemini over its REST API
pub struct GeminiExtractor {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiExtractor {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ExpenseExtractor for GeminiExtractor {
    async fn extract(
        &self,
        kind: ExtractionKind,
        mime_type: &str,
        data: &[u8],
        today: NaiveDate,
    ) -> Result<Option<RawExtraction>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DomainError::Extraction("chave da API não configurada.".to_string()))?;

        let body = build_request(kind, mime_type, data, today);
        debug!("Sending {} bytes of {} to {}", data.len(), mime_type, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Extraction(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("AI provider answered {}: {}", status, detail);
            return Err(DomainError::Extraction(format!("o provedor respondeu {}", status)).into());
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| DomainError::Extraction(e.to_string()))?;
        parse_response(&payload)
    }
}

fn instruction(kind: ExtractionKind, today: NaiveDate) -> String {
    let today = today.format("%Y-%m-%d");
    let categories = ExpenseCategory::ALL
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");

    match kind {
        ExtractionKind::Audio => format!(
            "Analise este áudio e extraia os detalhes da despesa.\n\
             Identifique o valor, uma descrição curta, o local (estabelecimento), a categoria mais apropriada e a data.\n\n\
             IMPORTANTE: A data de hoje é {today}.\n\
             - Se o usuário disser \"hoje\", use {today}.\n\
             - Se disser \"ontem\", calcule a data baseada em hoje.\n\
             - Se não mencionar data, use {today}.\n\n\
             Além disso, identifique o status:\n\
             - \"paid\" se o usuário disser \"paguei\", \"comprei\", \"gastei\".\n\
             - \"pending\" se disser \"chegou a conta\", \"boleto para pagar\", \"vence dia tal\".\n\
             - Na dúvida, use \"paid\".\n\n\
             Categorias permitidas: {categories}.\n\n\
             Retorne APENAS um JSON válido."
        ),
        ExtractionKind::Document => format!(
            "Analise este documento (Recibo, Nota Fiscal ou Fatura). Extraia os dados para registro financeiro.\n\n\
             Instruções:\n\
             1. Valor (amount): O valor TOTAL da nota.\n\
             2. Local (location): O nome do estabelecimento ou empresa emissora.\n\
             3. Data (date): A data de emissão no formato YYYY-MM-DD. Se não achar, use a data de hoje ({today}).\n\
             4. Descrição (description): Um resumo curto do que foi comprado (ex: \"Compras semanais\", \"Jantar\", \"Mensalidade escolar\").\n\
             5. Categoria: Escolha a melhor entre: {categories}.\n\
             6. Status: Se for nota fiscal de produto (mercado, restaurante), assuma \"paid\". Se for boleto ou fatura de serviço (luz, internet), assuma \"pending\".\n\n\
             Retorne APENAS o JSON."
        ),
    }
}

/// `generateContent` request body with the payload inlined as base64
pub fn build_request(kind: ExtractionKind, mime_type: &str, data: &[u8], today: NaiveDate) -> Value {
    let required = match kind {
        ExtractionKind::Audio => ["amount", "description", "category"],
        ExtractionKind::Document => ["amount", "location", "category"],
    };
    let categories: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.label()).collect();

    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": mime_type,
                        "data": base64::engine::general_purpose::STANDARD.encode(data),
                    }
                },
                { "text": instruction(kind, today) }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "amount": { "type": "NUMBER" },
                    "description": { "type": "STRING" },
                    "location": { "type": "STRING" },
                    "category": { "type": "STRING", "enum": categories },
                    "date": { "type": "STRING" },
                    "status": { "type": "STRING", "enum": ["paid", "pending", "cancelled"] }
                },
                "required": required
            }
        }
    })
}

/// Reads the JSON text of the first candidate; no text at all means `None`
pub fn parse_response(payload: &Value) -> Result<Option<RawExtraction>> {
    let text: String = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Ok(None);
    }

    let raw: RawExtraction = serde_json::from_str(text.trim())
        .map_err(|e| DomainError::Extraction(format!("resposta em formato inesperado ({})", e)))?;
    Ok(Some(raw))
}

/// Fill the gaps of a model answer; a missing or unreadable date means today
pub fn normalize_draft(raw: RawExtraction, today: NaiveDate) -> ExpenseDraft {
    let date = raw
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .unwrap_or(today);
    let status = raw
        .status
        .as_deref()
        .and_then(|s| s.parse::<ExpenseStatus>().ok())
        .unwrap_or(ExpenseStatus::Paid);
    let category = raw
        .category
        .as_deref()
        .and_then(|c| c.parse::<ExpenseCategory>().ok())
        .unwrap_or(ExpenseCategory::Outros);

    ExpenseDraft {
        amount: raw.amount.unwrap_or(Decimal::ZERO).abs(),
        description: raw.description.unwrap_or_default().trim().to_string(),
        location: raw.location.unwrap_or_default().trim().to_string(),
        category,
        date,
        status,
    }
}

#[derive(Clone)]
pub struct ExtractionService {
    extractor: Arc<dyn ExpenseExtractor>,
}

impl ExtractionService {
    pub fn new(extractor: Arc<dyn ExpenseExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn extract_draft(
        &self,
        kind: ExtractionKind,
        mime_type: Option<&str>,
        data: &[u8],
        today: NaiveDate,
    ) -> Result<Option<ExpenseDraft>> {
        if data.is_empty() {
            return Err(DomainError::validation("Nenhum arquivo enviado.").into());
        }

        let mime_type = match (kind, mime_type.map(str::trim).filter(|m| !m.is_empty())) {
            (_, Some(mime)) => mime.to_string(),
            (ExtractionKind::Audio, None) => DEFAULT_AUDIO_MIME.to_string(),
            (ExtractionKind::Document, None) => {
                return Err(DomainError::validation("Informe o tipo do arquivo enviado.").into())
            }
        };

        let draft = self
            .extractor
            .extract(kind, &mime_type, data, today)
            .await?
            .map(|raw| normalize_draft(raw, today));

        match &draft {
            Some(d) => info!("Extracted draft of {} in {} from {}", d.amount, d.category, mime_type),
            None => info!("AI provider returned no content for {}", mime_type),
        }
        Ok(draft)
    }
}
