//! Support tickets shown on the kanban board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LabeledEnum, Patch, Record, require_non_empty};
use crate::error::Result;

/// Kanban column a ticket sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Waiting,
    Resolved,
}

impl LabeledEnum for TicketStatus {
    const ALL: &'static [Self] = &[Self::Open, Self::InProgress, Self::Waiting, Self::Resolved];

    fn code(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Waiting => "waiting",
            Self::Resolved => "resolved",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Open => "Ouvert",
            Self::InProgress => "En cours",
            Self::Waiting => "En attente client",
            Self::Resolved => "Résolu",
        }
    }
}

/// Ticket urgency. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl LabeledEnum for TicketPriority {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High, Self::Urgent];

    fn code(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Low => "Basse",
            Self::Medium => "Moyenne",
            Self::High => "Haute",
            Self::Urgent => "Urgente",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub subject: String,
    pub description: String,
    /// Email of the subscriber who opened the ticket.
    pub requester: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl Ticket {
    pub fn new(
        subject: impl Into<String>,
        requester: impl Into<String>,
        priority: TicketPriority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            description: String::new(),
            requester: requester.into(),
            priority,
            status: TicketStatus::Open,
            created_at,
            assignee: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }
}

impl Record for Ticket {
    const ENTITY: &'static str = "tickets";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TicketPatch {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    /// `Some("")` unassigns the ticket.
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl Patch<Ticket> for TicketPatch {
    fn apply_to(self, ticket: &mut Ticket) -> Result<()> {
        if let Some(subject) = &self.subject {
            require_non_empty(subject, "Le sujet du ticket est requis")?;
        }
        if let Some(subject) = self.subject {
            ticket.subject = subject;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(assignee) = self.assignee {
            ticket.assignee = if assignee.trim().is_empty() { None } else { Some(assignee) };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(TicketPriority::Urgent > TicketPriority::High);
        assert!(TicketPriority::Low < TicketPriority::Medium);
    }

    #[test]
    fn test_patch_unassigns_on_empty() {
        let mut ticket = Ticket::new("Facture en double", "a@example.fr", TicketPriority::High, Utc::now());
        ticket.assignee = Some("support@example.fr".to_string());
        TicketPatch {
            assignee: Some(String::new()),
            status: Some(TicketStatus::InProgress),
            ..Default::default()
        }
        .apply_to(&mut ticket)
        .unwrap();

        assert_eq!(ticket.assignee, None);
        assert_eq!(ticket.status, TicketStatus::InProgress);
    }
}
