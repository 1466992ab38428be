//! # Backend Module
//!
//! Everything behind the HTTP port of the household expense tracker.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, extractors, mappers)
//!     ↓
//! Domain Layer (services, business rules)
//!     ↓
//! Storage Layer (JSON collections over a key-value store)
//! ```
//!
//! [`initialize_backend`] opens the store and builds the [`AppState`];
//! [`create_router`] mounts every API module under `/api`.

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use chrono::Local;
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::domain::{
    AuthService, BackupService, BudgetService, ExpenseExtractor, ExpenseService, ExportService,
    ExtractionService, GeminiExtractor, ReportService, SystemFinanceService, UserService,
};
use crate::backend::io::rest::{
    auth_apis, backup_apis, budget_apis, expense_apis, export_apis, extraction_apis, report_apis,
    system_apis, user_apis,
};
use crate::backend::storage::json::seeder::seed_demo_data;
use crate::backend::storage::JsonConnection;
use crate::config::AppConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService<JsonConnection>,
    pub user_service: UserService<JsonConnection>,
    pub expense_service: ExpenseService<JsonConnection>,
    pub report_service: ReportService<JsonConnection>,
    pub export_service: ExportService<JsonConnection>,
    pub budget_service: BudgetService<JsonConnection>,
    pub finance_service: SystemFinanceService<JsonConnection>,
    pub backup_service: BackupService<JsonConnection>,
    pub extraction_service: ExtractionService,
}

impl AppState {
    /// Wire every service to `connection`
    pub fn new(
        connection: &JsonConnection,
        config: &AppConfig,
        extractor: Arc<dyn ExpenseExtractor>,
    ) -> Self {
        Self {
            auth_service: AuthService::new(connection, config.session_ttl()),
            user_service: UserService::new(connection, config.payment_delay()),
            expense_service: ExpenseService::new(connection),
            report_service: ReportService::new(connection),
            export_service: ExportService::new(connection),
            budget_service: BudgetService::new(connection),
            finance_service: SystemFinanceService::new(
                connection,
                config.subscription_price,
                config.withdrawal_delay(),
            ),
            backup_service: BackupService::new(connection),
            extraction_service: ExtractionService::new(extractor),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Opening data directory {:?}", config.data_directory);
    let connection = JsonConnection::open(&config.data_directory)?;

    if config.seed_demo_data {
        seed_demo_data(&connection, Local::now().date_naive()).await?;
    }

    info!("Setting up domain services");
    let extractor = Arc::new(GeminiExtractor::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
    ));
    Ok(AppState::new(&connection, config, extractor))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let cors = match cors_origin {
        Some(origin) => cors.allow_origin(origin.parse::<HeaderValue>()?),
        None => cors.allow_origin(Any),
    };

    let api_routes = Router::new()
        .nest("/auth", auth_apis::router())
        .merge(user_apis::router())
        .nest("/expenses", expense_apis::router())
        .nest("/reports", report_apis::router())
        .nest("/export", export_apis::router())
        .nest("/budgets", budget_apis::router())
        .nest("/system", system_apis::router())
        .nest("/admin", backup_apis::router())
        .nest("/extract", extraction_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
