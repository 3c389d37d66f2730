//! Audit logging for back-office operations.
//!
//! Edits, exports, payment configuration changes and ticket moves are
//! reported to a [`DeskAuditLogger`]. The default is [`TracingAuditLogger`].

use std::fmt;

use async_trait::async_trait;

/// Audit event types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskAuditEvent {
    /// A table row was edited inline.
    RecordEdited {
        entity: &'static str,
        record_id: String,
        fields: Vec<String>,
    },
    /// A CSV export was generated.
    ExportGenerated {
        entity: &'static str,
        rows: usize,
        filename: String,
    },
    /// A payment method configuration was saved.
    PaymentConfigSaved { method: String, enabled: bool },
    /// A support ticket changed column.
    TicketMoved {
        ticket_id: String,
        from: String,
        to: String,
    },
}

impl fmt::Display for DeskAuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordEdited { entity, record_id, fields } => {
                write!(f, "Record edited: entity={}, id={}, fields=[{}]", entity, record_id, fields.join(","))
            }
            Self::ExportGenerated { entity, rows, filename } => {
                write!(f, "Export generated: entity={}, rows={}, file={}", entity, rows, filename)
            }
            Self::PaymentConfigSaved { method, enabled } => {
                write!(f, "Payment config saved: method={}, enabled={}", method, enabled)
            }
            Self::TicketMoved { ticket_id, from, to } => {
                write!(f, "Ticket moved: id={}, from={}, to={}", ticket_id, from, to)
            }
        }
    }
}

/// Trait for audit logging backends.
#[async_trait]
pub trait DeskAuditLogger: Send + Sync {
    /// Log an audit event. Implementations must not fail the calling operation.
    async fn log(&self, event: DeskAuditEvent);
}

/// Audit logger that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditLogger;

#[async_trait]
impl DeskAuditLogger for NoOpAuditLogger {
    async fn log(&self, _event: DeskAuditEvent) {}
}

/// Logs audit events through `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

#[async_trait]
impl DeskAuditLogger for TracingAuditLogger {
    async fn log(&self, event: DeskAuditEvent) {
        tracing::info!(
            target: "ledgerdesk::audit",
            event_type = %event_kind(&event),
            "{}", event
        );
    }
}

fn event_kind(event: &DeskAuditEvent) -> &'static str {
    match event {
        DeskAuditEvent::RecordEdited { .. } => "record_edited",
        DeskAuditEvent::ExportGenerated { .. } => "export_generated",
        DeskAuditEvent::PaymentConfigSaved { .. } => "payment_config_saved",
        DeskAuditEvent::TicketMoved { .. } => "ticket_moved",
    }
}
