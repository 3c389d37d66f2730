use std::sync::Arc;
use std::time::Duration;

use crate::audit::{DeskAuditLogger, TracingAuditLogger};
use crate::config::{Config, PaymentConfigSettings, TableConfig};
use crate::export::CsvExporter;
use crate::payment_config::{InMemoryKeyValueStore, KeyValueStore, PaymentConfigService};
use crate::records::{Invoice, Payment, Subscriber, Ticket};
use crate::repository::{InMemoryRepository, RecordRepository};
use crate::support::SupportDesk;
use crate::testing::DemoData;

/// Shared state handed to every handler.
///
/// Repositories and services are trait objects so deployments can swap the
/// in-memory defaults for other backends.
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<dyn RecordRepository<Invoice>>,
    pub payments: Arc<dyn RecordRepository<Payment>>,
    pub subscribers: Arc<dyn RecordRepository<Subscriber>>,
    pub tickets: Arc<dyn RecordRepository<Ticket>>,
    pub support: SupportDesk,
    pub payment_config: PaymentConfigService,
    pub exporter: CsvExporter,
    pub audit: Arc<dyn DeskAuditLogger>,
    pub table: TableConfig,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("table", &self.table)
            .field("exporter", &self.exporter)
            .field("payment_config", &self.payment_config)
            .finish_non_exhaustive()
    }
}

/// Builder for AppState
#[must_use = "builder does nothing until you call build()"]
pub struct AppStateBuilder {
    invoices: Arc<dyn RecordRepository<Invoice>>,
    payments: Arc<dyn RecordRepository<Payment>>,
    subscribers: Arc<dyn RecordRepository<Subscriber>>,
    tickets: Arc<dyn RecordRepository<Ticket>>,
    store: Arc<dyn KeyValueStore>,
    audit: Arc<dyn DeskAuditLogger>,
    table: TableConfig,
    export_delay: Duration,
    payment_settings: PaymentConfigSettings,
}

impl AppStateBuilder {
    /// Empty in-memory repositories, tracing audit log, default settings.
    pub fn new() -> Self {
        Self {
            invoices: Arc::new(InMemoryRepository::<Invoice>::new()),
            payments: Arc::new(InMemoryRepository::<Payment>::new()),
            subscribers: Arc::new(InMemoryRepository::<Subscriber>::new()),
            tickets: Arc::new(InMemoryRepository::<Ticket>::new()),
            store: Arc::new(InMemoryKeyValueStore::new()),
            audit: Arc::new(TracingAuditLogger),
            table: TableConfig::default(),
            export_delay: Duration::ZERO,
            payment_settings: PaymentConfigSettings::default(),
        }
    }

    /// Apply the table, export and payment-configuration sections of `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.table = config.table.clone();
        self.export_delay = Duration::from_millis(config.export.delay_ms);
        self.payment_settings = config.payment_config.clone();
        self
    }

    pub fn with_invoices(mut self, repo: Arc<dyn RecordRepository<Invoice>>) -> Self {
        self.invoices = repo;
        self
    }

    pub fn with_payments(mut self, repo: Arc<dyn RecordRepository<Payment>>) -> Self {
        self.payments = repo;
        self
    }

    pub fn with_subscribers(mut self, repo: Arc<dyn RecordRepository<Subscriber>>) -> Self {
        self.subscribers = repo;
        self
    }

    pub fn with_tickets(mut self, repo: Arc<dyn RecordRepository<Ticket>>) -> Self {
        self.tickets = repo;
        self
    }

    /// Replace every repository with in-memory ones seeded from `data`.
    pub fn with_demo_data(self, data: DemoData) -> Self {
        self.with_invoices(Arc::new(InMemoryRepository::seeded(data.invoices)))
            .with_payments(Arc::new(InMemoryRepository::seeded(data.payments)))
            .with_subscribers(Arc::new(InMemoryRepository::seeded(data.subscribers)))
            .with_tickets(Arc::new(InMemoryRepository::seeded(data.tickets)))
    }

    pub fn with_key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn DeskAuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_payment_settings(mut self, settings: PaymentConfigSettings) -> Self {
        self.payment_settings = settings;
        self
    }

    pub fn build(self) -> AppState {
        AppState {
            support: SupportDesk::new(self.tickets.clone(), self.audit.clone()),
            payment_config: PaymentConfigService::new(
                self.store,
                self.payment_settings,
                self.audit.clone(),
            ),
            exporter: CsvExporter::new(self.export_delay, self.audit.clone()),
            invoices: self.invoices,
            payments: self.payments,
            subscribers: self.subscribers,
            tickets: self.tickets,
            audit: self.audit,
            table: self.table,
        }
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
