//! Export service domain logic.
//!
//! Builds the downloadable files of the history and expense list views: a
//! simple CSV of a selection, a quoted CSV of the filtered list, a JSON dump
//! and a printable HTML report. Files are returned in memory; saving them is
//! up to the client.

use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use shared::GroupMode;
use std::collections::HashMap;

use crate::backend::domain::commands::expenses::ExpenseFilter;
use crate::backend::domain::commands::exports::ExportFile;
use crate::backend::domain::errors::{DomainError, EMPTY_SELECTION};
use crate::backend::domain::expense_service::sort_newest_first;
use crate::backend::domain::formatting::{fixed2, format_brl, format_date_br};
use crate::backend::domain::models::expense::Expense;
use crate::backend::domain::models::user::User;
use crate::backend::storage::{Connection, ExpenseStorage, UserStorage};

pub const UNKNOWN_USER: &str = "Desconhecido";

const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json";
const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// Resolves user ids to display names; deleted users show as "Desconhecido"
pub struct UserNames(HashMap<String, String>);

impl UserNames {
    pub fn new(users: &[User]) -> Self {
        Self(users.iter().map(|u| (u.id.clone(), u.name.clone())).collect())
    }

    pub fn name_of(&self, user_id: &str) -> &str {
        self.0.get(user_id).map(String::as_str).unwrap_or(UNKNOWN_USER)
    }
}

#[derive(Clone)]
pub struct ExportService<C: Connection> {
    expenses: C::ExpenseRepository,
    users: C::UserRepository,
}

impl<C: Connection> ExportService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            expenses: connection.create_expense_repository(),
            users: connection.create_user_repository(),
        }
    }

    /// Simple CSV of the selected expenses, named after the grouping mode
    pub async fn export_history_csv(
        &self,
        expense_ids: &[String],
        mode: GroupMode,
        today: NaiveDate,
    ) -> Result<ExportFile> {
        let selected = self.selection(expense_ids).await?;
        let names = self.user_names().await?;

        let file = ExportFile {
            filename: format!("relatorio_{}_{}.csv", mode.as_str(), today.format("%Y-%m-%d")),
            content_type: CSV_CONTENT_TYPE.to_string(),
            content: history_csv(&selected, &names),
            expense_count: selected.len(),
        };
        info!("Exported {} expenses to {}", file.expense_count, file.filename);
        Ok(file)
    }

    /// Quoted CSV of every expense matching `filter`
    pub async fn export_ledger_csv(&self, filter: &ExpenseFilter, today: NaiveDate) -> Result<ExportFile> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .list_expenses()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        sort_newest_first(&mut expenses);
        let names = self.user_names().await?;

        let file = ExportFile {
            filename: format!("gastos_{}.csv", today.format("%Y-%m-%d")),
            content_type: CSV_CONTENT_TYPE.to_string(),
            content: ledger_csv(&expenses, &names)?,
            expense_count: expenses.len(),
        };
        info!("Exported {} expenses to {}", file.expense_count, file.filename);
        Ok(file)
    }

    /// Pretty-printed JSON of the selected expense records
    pub async fn export_json(&self, expense_ids: &[String], today: NaiveDate) -> Result<ExportFile> {
        let selected = self.selection(expense_ids).await?;
        Ok(ExportFile {
            filename: format!("dados_exportados_{}.json", today.format("%Y-%m-%d")),
            content_type: JSON_CONTENT_TYPE.to_string(),
            content: serde_json::to_string_pretty(&selected)?,
            expense_count: selected.len(),
        })
    }

    /// Printable HTML report of the selection; opens the print dialog on load
    pub async fn export_print_report(&self, expense_ids: &[String], today: NaiveDate) -> Result<ExportFile> {
        let selected = self.selection(expense_ids).await?;
        let names = self.user_names().await?;
        Ok(ExportFile {
            filename: format!("relatorio_{}.html", today.format("%Y-%m-%d")),
            content_type: HTML_CONTENT_TYPE.to_string(),
            content: print_report_html(&selected, &names, today),
            expense_count: selected.len(),
        })
    }

    async fn selection(&self, expense_ids: &[String]) -> Result<Vec<Expense>> {
        let mut selected: Vec<Expense> = self
            .expenses
            .list_expenses()
            .await?
            .into_iter()
            .filter(|e| expense_ids.contains(&e.id))
            .collect();
        if selected.is_empty() {
            return Err(DomainError::validation(EMPTY_SELECTION).into());
        }
        sort_newest_first(&mut selected);
        Ok(selected)
    }

    async fn user_names(&self) -> Result<UserNames> {
        Ok(UserNames::new(&self.users.list_users().await?))
    }
}

/// Drop characters that would break the unquoted CSV layout
fn plain_field(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Unquoted CSV: commas are stripped from text fields instead of escaped
pub fn history_csv(expenses: &[Expense], names: &UserNames) -> String {
    let mut lines = Vec::with_capacity(expenses.len() + 1);
    lines.push("Data,Usuario,Categoria,Local,Descricao,Valor,Status".to_string());
    for e in expenses {
        lines.push(
            [
                e.date.format("%Y-%m-%d").to_string(),
                plain_field(names.name_of(&e.user_id)),
                e.category.label().to_string(),
                plain_field(&e.location),
                plain_field(&e.description),
                fixed2(e.amount),
                e.status.as_str().to_string(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// CSV written with the `csv` crate; text fields are quoted and embedded
/// quotes doubled
pub fn ledger_csv(expenses: &[Expense], names: &UserNames) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["Data", "Status", "Usuario", "Categoria", "Local", "Descricao", "Valor", "Obs"])?;
    for e in expenses {
        writer.write_record([
            e.date.format("%Y-%m-%d").to_string(),
            e.status.as_str().to_string(),
            names.name_of(&e.user_id).to_string(),
            e.category.label().to_string(),
            e.location.clone(),
            e.description.clone(),
            e.amount.normalize().to_string(),
            e.notes.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Self-contained HTML page meant to be printed to PDF by the browser
pub fn print_report_html(expenses: &[Expense], names: &UserNames, generated_on: NaiveDate) -> String {
    let total: Decimal = expenses.iter().map(|e| e.amount).sum();

    let rows: String = expenses
        .iter()
        .map(|e| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                format_date_br(e.date),
                escape_html(names.name_of(&e.user_id)),
                escape_html(e.category.label()),
                escape_html(&e.description),
                escape_html(&e.location),
                format_brl(e.amount),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>Relatório de Despesas</title>
<style>
body {{ font-family: sans-serif; padding: 20px; }}
table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
th {{ background-color: #f2f2f2; }}
.header {{ margin-bottom: 20px; border-bottom: 2px solid #333; padding-bottom: 10px; }}
.total {{ text-align: right; font-size: 1.2em; font-weight: bold; margin-top: 20px; }}
</style>
</head>
<body onload="window.print()">
<div class="header">
<h1>Relatório de Despesas</h1>
<p>Gerado em: {generated}</p>
<p>Itens selecionados: {count}</p>
</div>
<table>
<thead>
<tr><th>Data</th><th>Responsável</th><th>Categoria</th><th>Descrição</th><th>Local</th><th>Valor</th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>
<div class="total">Total: {total}</div>
</body>
</html>
"#,
        generated = format_date_br(generated_on),
        count = expenses.len(),
        rows = rows,
        total = format_brl(total),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::json::seeder::seed_demo_data;
    use crate::backend::storage::JsonConnection;
    use rust_decimal_macros::dec;
    use shared::{ExpenseCategory, ExpenseStatus};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    async fn seeded() -> (JsonConnection, ExportService<JsonConnection>) {
        let connection = JsonConnection::in_memory();
        seed_demo_data(&connection, today()).await.unwrap();
        let service = ExportService::new(&connection);
        (connection, service)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_history_csv_has_header_plus_one_row_per_selected() {
        let (_connection, service) = seeded().await;
        let file = service
            .export_history_csv(&ids(&["e1", "e3", "e5"]), GroupMode::Week, today())
            .await
            .unwrap();

        assert_eq!(file.filename, "relatorio_week_2025-03-10.csv");
        assert_eq!(file.expense_count, 3);

        let lines: Vec<&str> = file.content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Data,Usuario,Categoria,Local,Descricao,Valor,Status");
        assert_eq!(
            lines[1],
            "2025-03-10,Carlos (Pai),Mercado,Carrefour,Compras do Mês,450.50,paid"
        );
        assert_eq!(lines[3], "2025-03-05,Carlos (Pai),Contas Fixas,Imobiliária,Aluguel,2500.00,pending");
    }

    #[tokio::test]
    async fn test_history_csv_strips_commas_and_names_orphans() {
        let expense = Expense {
            id: "x".to_string(),
            user_id: "deleted".to_string(),
            amount: dec!(1),
            description: "Pão, leite\ne café".to_string(),
            location: "Rua A, 10".to_string(),
            category: ExpenseCategory::Mercado,
            date: today(),
            status: ExpenseStatus::Paid,
            notes: None,
            attachment_name: None,
            attachment_data: None,
        };
        let csv = history_csv(&[expense], &UserNames::new(&[]));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2025-03-10,Desconhecido,Mercado,Rua A 10,Pão leite e café,1.00,paid");
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let (_connection, service) = seeded().await;
        for result in [
            service.export_history_csv(&[], GroupMode::Month, today()).await,
            service.export_json(&ids(&["nope"]), today()).await,
            service.export_print_report(&[], today()).await,
        ] {
            let err = result.unwrap_err();
            assert_eq!(
                err.downcast_ref::<DomainError>(),
                Some(&DomainError::validation(EMPTY_SELECTION))
            );
        }
    }

    #[tokio::test]
    async fn test_ledger_csv_quotes_text_fields() {
        let (connection, service) = seeded().await;
        connection
            .create_expense_repository()
            .update_expense(
                "e2",
                &crate::backend::domain::models::expense::ExpensePatch {
                    description: Some("Jantar \"especial\", sábado".to_string()),
                    notes: Some("aniversário".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let filter = ExpenseFilter {
            user_id: Some("u2".to_string()),
            ..Default::default()
        };
        let file = service.export_ledger_csv(&filter, today()).await.unwrap();
        assert_eq!(file.filename, "gastos_2025-03-10.csv");
        assert_eq!(file.expense_count, 2);

        let mut reader = csv::Reader::from_reader(file.content.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["Data", "Status", "Usuario", "Categoria", "Local", "Descricao", "Valor", "Obs"]
        );
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][5], "Jantar \"especial\", sábado");
        assert_eq!(&records[0][7], "aniversário");
        assert_eq!(&records[0][6], "120");

        assert!(file.content.contains("\"Jantar \"\"especial\"\", sábado\""));
    }

    #[tokio::test]
    async fn test_json_export_is_pretty_camel_case() {
        let (_connection, service) = seeded().await;
        let file = service.export_json(&ids(&["e4"]), today()).await.unwrap();
        assert_eq!(file.filename, "dados_exportados_2025-03-10.json");
        assert!(file.content.contains("\n  {"));
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&file.content).unwrap();
        assert_eq!(parsed[0]["userId"], "u3");
    }

    #[tokio::test]
    async fn test_print_report_escapes_and_totals() {
        let (connection, service) = seeded().await;
        connection
            .create_expense_repository()
            .update_expense(
                "e5",
                &crate::backend::domain::models::expense::ExpensePatch {
                    description: Some("<script>alert(1)</script>".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let file = service
            .export_print_report(&ids(&["e3", "e5"]), today())
            .await
            .unwrap();
        assert!(file.content.contains("Relatório de Despesas"));
        assert!(file.content.contains("Gerado em: 10/03/2025"));
        assert!(file.content.contains("Itens selecionados: 2"));
        assert!(file.content.contains("Total: R$ 2.800,00"));
        assert!(file.content.contains("window.print()"));
        assert!(file.content.contains("&lt;script&gt;"));
        assert!(!file.content.contains("<script>"));
    }
}
