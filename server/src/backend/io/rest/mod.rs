//! # REST API Interface Layer
//!
//! Every module exposes a `router()` that is nested under `/api` by
//! [`create_router`](crate::backend::create_router). Handlers log the route,
//! call one service and map the result; role checks happen in the extractors
//! of [`access`].

pub mod access;
pub mod error;
pub mod extract;
pub mod mappers;

pub mod auth_apis;
pub mod backup_apis;
pub mod budget_apis;
pub mod expense_apis;
pub mod export_apis;
pub mod extraction_apis;
pub mod report_apis;
pub mod system_apis;
pub mod user_apis;

use chrono::{Local, NaiveDate};

/// Body limit of routes that carry receipt attachments or files
pub(crate) const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Body limit of a full database restore, attachments included
pub(crate) const MAX_BACKUP_BYTES: usize = 256 * 1024 * 1024;

/// Calendar day on the server clock
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
