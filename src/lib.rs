//! Ledgerdesk - billing back-office service
//!
//! Serves the invoice, payment and subscriber tables of a subscription
//! business, with a shared filter / sort / paginate pipeline, CSV export,
//! payment-method configuration and a support ticket board.
//!
//! # Features
//!
//! - **Tables**: one [`table::TableSchema`] per entity drives search, status
//!   tabs, column filters, date ranges and pagination
//! - **Export**: CSV of the filtered rows with French headers
//! - **Payment configuration**: Stripe, card processing and bank transfer
//!   settings with validation and secret masking
//! - **Support**: kanban board over support tickets
//! - **Audit**: every edit, export and configuration change is logged
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ledgerdesk::{App, AppState, ConfigBuilder};
//!
//! #[tokio::main]
//! async fn main() -> ledgerdesk::Result<()> {
//!     ledgerdesk::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     let state = AppState::builder().with_config(&config).build();
//!
//!     App::new(config, state).serve().await
//! }
//! ```

mod app;
pub mod audit;
mod config;
mod core;
mod error;
pub mod export;
pub mod health;
pub mod http;
pub mod payment_config;
pub mod records;
pub mod repository;
pub mod support;
pub mod table;
pub mod testing;
pub mod utils;

// Re-exports for public API
pub use app::{AppState, AppStateBuilder};
pub use audit::{DeskAuditEvent, DeskAuditLogger, NoOpAuditLogger, TracingAuditLogger};
pub use config::{
    Config, ConfigBuilder, ExportConfig, LoggingConfig, PaymentConfigSettings, ServerConfig,
    TableConfig,
};
pub use self::core::{App, router};
pub use error::{DeskError, ErrorResponse, Result};
pub use export::{CsvExport, CsvExporter, CsvFile};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{ApiResponse, RouteModule, TableQuery};
pub use repository::{
    InMemoryRepository, Mutation, RecordRepository, edit_record, sync_subscriber_refs,
};
pub use support::{KanbanBoard, SupportDesk};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "ledgerdesk=debug")
/// - `LEDGERDESK_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("LEDGERDESK_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing from the logging section of a [`Config`].
///
/// `RUST_LOG` still wins over the configured level when set.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
