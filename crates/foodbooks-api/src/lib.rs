//! JSON HTTP API over the foodbooks record collections
//!
//! Routes are organized into modules:
//! - routes::accounts: classified ledger accounts and the code classifier
//! - routes::records: list/detail/create/update/delete for every kind
//! - routes::session: sign in and out
//! - routes::system: health, stats and refresh
//! - routes::time: date-range presets

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Json, Router,
};
use foodbooks_config::{Config, CurrencyConfig, SymbolPosition};
use foodbooks_core::{ApiEnvelope, Books, SessionContext};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<Books>,
    pub config: Arc<Config>,
    pub session: Arc<SessionContext>,
}

impl AppState {
    pub fn new(config: Config, books: Arc<Books>) -> Self {
        Self {
            books,
            config: Arc::new(config),
            session: Arc::new(SessionContext::new()),
        }
    }

    /// Amount formatted with the configured currency settings
    pub fn format_money(&self, value: Decimal) -> String {
        format_money(&self.config.currency, value)
    }
}

pub fn format_money(currency: &CurrencyConfig, value: Decimal) -> String {
    let number = foodbooks_utils::format_amount(
        value,
        currency.decimal_places,
        &currency.thousands_separator,
        &currency.decimal_separator,
    );
    foodbooks_utils::with_symbol(
        &number,
        &currency.symbol,
        currency.symbol_position == SymbolPosition::Before,
    )
}

/// Wrap data in the success envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope::ok(data))
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{api_account_zones, api_accounts, api_classify, api_create_account};
    use routes::records::{api_create, api_delete, api_detail, api_list, api_refresh_kind, api_update};
    use routes::session::{api_login, api_logout, api_session};
    use routes::system::{api_refresh_all, api_stats, health_check};
    use routes::time::api_time_range;

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stats", get(api_stats))
        .route("/api/refresh", post(api_refresh_all))
        .route("/api/time-range", get(api_time_range))
        .route("/api/session", get(api_session).post(api_login).delete(api_logout))
        .route("/api/accounts", get(api_accounts).post(api_create_account))
        .route("/api/accounts/classify", get(api_classify))
        .route("/api/accounts/zones", get(api_account_zones))
        .route("/api/:kind", get(api_list).post(api_create))
        .route("/api/:kind/refresh", post(api_refresh_kind))
        .route("/api/:kind/:id", get(api_detail).put(api_update).delete(api_delete))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server and run until Ctrl-C
pub async fn start_server(config: Config, books: Arc<Books>) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, books);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting foodbooks server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /api/:kind (receipts, credit-notes, sales, purchase-orders, usage-logs, products)");
    log::info!("  - /api/accounts (classified ledger accounts)");
    log::info!("  - /api/session, /api/stats, /api/refresh");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        let mut currency = CurrencyConfig::default();
        assert_eq!(format_money(&currency, Decimal::new(125050, 2)), "Rs. 1,250.50");

        currency.symbol = "EUR".to_string();
        currency.symbol_position = SymbolPosition::After;
        currency.thousands_separator = ".".to_string();
        currency.decimal_separator = ",".to_string();
        assert_eq!(format_money(&currency, Decimal::new(-98765, 1)), "-9.876,50 EUR");
    }
}
