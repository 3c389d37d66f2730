//! Invoices issued to subscribers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    LabeledEnum, Patch, PaymentRef, Record, SubscriberRef, SubscriptionRef, require_non_negative,
};
use crate::error::{DeskError, Result};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Not yet sent to the subscriber.
    Draft,
    /// Sent and awaiting payment.
    Pending,
    /// Settled.
    Paid,
    /// Past its due date without payment.
    Overdue,
    /// Cancelled, no longer payable.
    Cancelled,
}

impl LabeledEnum for InvoiceStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Pending,
        Self::Paid,
        Self::Overdue,
        Self::Cancelled,
    ];

    fn code(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Brouillon",
            Self::Pending => "En attente",
            Self::Paid => "Payée",
            Self::Overdue => "En retard",
            Self::Cancelled => "Annulée",
        }
    }
}

/// An invoice as listed in the invoices table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    /// Human-facing number, e.g. `FAC-2024-0001`.
    pub number: String,
    pub subscriber: SubscriberRef,
    pub amount_cents: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionRef>,
    #[serde(default)]
    pub payment: Option<PaymentRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Invoice {
    /// Create an invoice due thirty days after issue.
    pub fn new(
        number: impl Into<String>,
        subscriber: SubscriberRef,
        amount_cents: i64,
        status: InvoiceStatus,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            subscriber,
            amount_cents,
            currency: "eur".to_string(),
            status,
            issue_date,
            due_date: issue_date + chrono::Days::new(30),
            subscriptions: Vec::new(),
            payment: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_subscriptions<I, T>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.subscriptions = titles.into_iter().map(SubscriptionRef::new).collect();
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }
}

impl Record for Invoice {
    const ENTITY: &'static str = "invoices";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Inline edit of an invoice row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvoicePatch {
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Patch<Invoice> for InvoicePatch {
    fn apply_to(self, invoice: &mut Invoice) -> Result<()> {
        if let Some(amount) = self.amount_cents {
            require_non_negative(amount)?;
        }
        let due_date = self.due_date.unwrap_or(invoice.due_date);
        if due_date < invoice.issue_date {
            return Err(DeskError::validation(
                "La date d'échéance doit être postérieure à la date d'émission",
            ));
        }

        if let Some(status) = self.status {
            invoice.status = status;
        }
        if let Some(amount) = self.amount_cents {
            invoice.amount_cents = amount;
        }
        invoice.due_date = due_date;
        if let Some(notes) = self.notes {
            invoice.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        }
        Ok(())
    }
}
