//! CSV export of filtered table rows.
//!
//! Every entity is written with RFC 4180 quoting through the `csv` crate.
//! Column sets and French headers are fixed per entity by [`CsvExport`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::audit::{DeskAuditEvent, DeskAuditLogger};
use crate::error::{DeskError, Result};
use crate::records::money::format_amount;
use crate::records::{Invoice, LabeledEnum, Payment, Record, Subscriber, iso_date};

/// A record type with a CSV layout.
pub trait CsvExport: Record {
    fn headers() -> &'static [&'static str];

    /// Cells in header order.
    fn csv_row(&self) -> Vec<String>;
}

fn yes_no(value: bool) -> String {
    let text = if value { "oui" } else { "non" };
    text.to_string()
}

fn subscription_titles(titles: impl Iterator<Item = String>) -> String {
    titles.collect::<Vec<_>>().join(", ")
}

impl CsvExport for Invoice {
    fn headers() -> &'static [&'static str] {
        &[
            "Numéro",
            "Abonné",
            "E-mail",
            "Montant",
            "Devise",
            "Statut",
            "Date d'émission",
            "Date d'échéance",
            "Abonnements",
            "Notes",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.number.clone(),
            self.subscriber.name.clone(),
            self.subscriber.email.clone(),
            format_amount(self.amount_cents),
            self.currency.to_uppercase(),
            self.status.label().to_string(),
            iso_date(self.issue_date),
            iso_date(self.due_date),
            subscription_titles(self.subscriptions.iter().map(|s| s.title.clone())),
            self.notes.clone().unwrap_or_default(),
        ]
    }
}

impl CsvExport for Payment {
    fn headers() -> &'static [&'static str] {
        &[
            "Référence",
            "Facture",
            "Abonné",
            "Montant",
            "Devise",
            "Moyen de paiement",
            "Statut",
            "Date de paiement",
            "Facture générée",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.reference.clone(),
            self.invoice_number.clone(),
            self.subscriber.name.clone(),
            format_amount(self.amount_cents),
            self.currency.to_uppercase(),
            self.method.label().to_string(),
            self.status.label().to_string(),
            iso_date(self.paid_at),
            yes_no(self.invoice_generated),
        ]
    }
}

impl CsvExport for Subscriber {
    fn headers() -> &'static [&'static str] {
        &[
            "Nom",
            "E-mail",
            "Société",
            "Statut",
            "Facturation",
            "Montant mensuel",
            "Date d'inscription",
            "Abonnements",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.company.clone().unwrap_or_default(),
            self.status.label().to_string(),
            self.billing_cycle.label().to_string(),
            format_amount(self.monthly_amount_cents),
            iso_date(self.joined_at),
            subscription_titles(self.subscriptions.iter().map(|s| s.title.clone())),
        ]
    }
}

/// Render rows as CSV text with a header line.
pub fn export_csv<R: CsvExport>(rows: &[R]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.csv_row())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DeskError::internal(format!("failed to flush csv: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| DeskError::internal(format!("csv is not utf-8: {}", e)))
}

/// `<entity>_export_<YYYYMMDD_HHmmss>.csv`
pub fn export_filename(entity: &str, now: DateTime<Utc>) -> String {
    format!("{}_export_{}.csv", entity, now.format("%Y%m%d_%H%M%S"))
}

/// A generated export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub filename: String,
    pub content: String,
}

/// Produces exports, applying the configured delay and auditing each one.
#[derive(Clone)]
pub struct CsvExporter {
    delay: Duration,
    audit: Arc<dyn DeskAuditLogger>,
}

impl CsvExporter {
    pub fn new(delay: Duration, audit: Arc<dyn DeskAuditLogger>) -> Self {
        Self { delay, audit }
    }

    pub async fn export<R: CsvExport>(&self, rows: &[R], now: DateTime<Utc>) -> Result<CsvFile> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let content = export_csv(rows)?;
        let filename = export_filename(R::ENTITY, now);

        tracing::debug!(
            target: "ledgerdesk::export",
            entity = R::ENTITY,
            rows = rows.len(),
            bytes = content.len(),
            "csv export generated"
        );
        self.audit
            .log(DeskAuditEvent::ExportGenerated {
                entity: R::ENTITY,
                rows: rows.len(),
                filename: filename.clone(),
            })
            .await;

        Ok(CsvFile { filename, content })
    }
}

impl std::fmt::Debug for CsvExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvExporter")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
