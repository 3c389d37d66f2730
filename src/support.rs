//! Support ticket kanban board.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::audit::{DeskAuditEvent, DeskAuditLogger};
use crate::error::{DeskError, Result};
use crate::records::{LabeledEnum, Ticket, TicketStatus};
use crate::repository::RecordRepository;

/// One board column.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn {
    pub status: TicketStatus,
    pub label: &'static str,
    pub tickets: Vec<Ticket>,
}

/// Tickets grouped by status, one column per status in workflow order.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
}

impl KanbanBoard {
    /// Group tickets into columns. Within a column the most urgent tickets
    /// come first, then the oldest.
    pub fn from_tickets(tickets: impl IntoIterator<Item = Ticket>) -> Self {
        let mut columns: Vec<KanbanColumn> = TicketStatus::ALL
            .iter()
            .map(|status| KanbanColumn {
                status: *status,
                label: status.label(),
                tickets: Vec::new(),
            })
            .collect();

        for ticket in tickets {
            if let Some(column) = columns.iter_mut().find(|c| c.status == ticket.status) {
                column.tickets.push(ticket);
            }
        }
        for column in &mut columns {
            column.tickets.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            });
        }
        Self { columns }
    }

    pub fn column(&self, status: TicketStatus) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.tickets.len()).sum()
    }
}

/// Detail panel data for one ticket.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub status_label: &'static str,
    pub priority_label: &'static str,
    /// Columns the ticket can be moved to.
    pub moves: Vec<TicketStatus>,
}

/// Board operations over the ticket repository.
#[derive(Clone)]
pub struct SupportDesk {
    tickets: Arc<dyn RecordRepository<Ticket>>,
    audit: Arc<dyn DeskAuditLogger>,
}

impl SupportDesk {
    pub fn new(tickets: Arc<dyn RecordRepository<Ticket>>, audit: Arc<dyn DeskAuditLogger>) -> Self {
        Self { tickets, audit }
    }

    /// Board over all tickets, optionally narrowed by a subject/requester search.
    pub async fn board(&self, search: Option<&str>) -> Result<KanbanBoard> {
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let tickets = self.tickets.list().await?;
        let tickets = tickets.into_iter().filter(|t| match &needle {
            Some(needle) => {
                t.subject.to_lowercase().contains(needle.as_str())
                    || t.requester.to_lowercase().contains(needle.as_str())
            }
            None => true,
        });
        Ok(KanbanBoard::from_tickets(tickets))
    }

    async fn find(&self, id: Uuid) -> Result<Ticket> {
        self.tickets
            .get(id)
            .await?
            .ok_or_else(|| DeskError::not_found(format!("Ticket {}", id)))
    }

    pub async fn ticket_detail(&self, id: Uuid) -> Result<TicketDetail> {
        let ticket = self.find(id).await?;
        let moves = TicketStatus::ALL
            .iter()
            .copied()
            .filter(|s| *s != ticket.status)
            .collect();
        Ok(TicketDetail {
            status_label: ticket.status.label(),
            priority_label: ticket.priority.label(),
            moves,
            ticket,
        })
    }

    /// Move a ticket to another column. Moving to its current column is a no-op.
    pub async fn move_ticket(&self, id: Uuid, status: TicketStatus) -> Result<Ticket> {
        let mut from = status;
        let ticket = self
            .tickets
            .modify(
                id,
                Box::new(|ticket: &mut Ticket| {
                    from = ticket.status;
                    ticket.status = status;
                    Ok(())
                }),
            )
            .await
            .map_err(|err| match err {
                DeskError::NotFound(_) => DeskError::not_found(format!("Ticket {}", id)),
                other => other,
            })?;
        if from == status {
            return Ok(ticket);
        }

        tracing::debug!(
            target: "ledgerdesk::support",
            ticket_id = %id,
            from = from.code(),
            to = status.code(),
            "ticket moved"
        );
        self.audit
            .log(DeskAuditEvent::TicketMoved {
                ticket_id: id.to_string(),
                from: from.code().to_string(),
                to: status.code().to_string(),
            })
            .await;
        Ok(ticket)
    }
}

impl std::fmt::Debug for SupportDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportDesk").finish_non_exhaustive()
    }
}
