//! Domain records shown in the back-office tables.
//!
//! Invoices, payments, subscribers and support tickets, plus the small
//! reference types they embed. Records are plain data: filtering never
//! mutates them and edits go through a [`Patch`].

pub mod invoice;
pub mod money;
pub mod payment;
pub mod subscriber;
pub mod ticket;

use std::fmt::Debug;
use std::hash::Hash;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use invoice::{Invoice, InvoicePatch, InvoiceStatus};
pub use payment::{Payment, PaymentMethodKind, PaymentPatch, PaymentStatus};
pub use subscriber::{BillingCycle, Subscriber, SubscriberPatch, SubscriberStatus};
pub use ticket::{Ticket, TicketPatch, TicketPriority, TicketStatus};

/// A record that can be stored in a repository and listed in a table.
pub trait Record: Clone + Send + Sync + 'static {
    /// Plural entity name, used for routes and export file names.
    const ENTITY: &'static str;

    /// Stable identifier of the record.
    fn id(&self) -> Uuid;
}

/// A closed set of values with a stable code and a French display label.
///
/// Statuses, payment methods and billing cycles implement this so that the
/// table layer can build label lookups and tab summaries generically.
pub trait LabeledEnum: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Stable machine code (`paid`, `credit_card`, ...).
    fn code(&self) -> &'static str;

    /// Display label.
    fn label(&self) -> &'static str;

    /// Parse a machine code.
    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }
}

/// Partial update applied to a record by inline editing.
pub trait Patch<R> {
    /// Validate and apply the patch in place.
    fn apply_to(self, record: &mut R) -> Result<()>;
}

/// Reference to the subscriber an invoice or payment belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl SubscriberRef {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<&Subscriber> for SubscriberRef {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            id: subscriber.id,
            name: subscriber.name.clone(),
            email: subscriber.email.clone(),
        }
    }
}

/// A subscription (plan) a record relates to. Filtered by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRef {
    pub id: Uuid,
    pub title: String,
}

impl SubscriptionRef {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
        }
    }
}

/// Reference from an invoice to the payment that settled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRef {
    pub id: Uuid,
    pub reference: String,
}

/// Render a date the way French users type it (`05/01/2024`).
pub fn french_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Render a date as ISO 8601 (`2024-01-05`).
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn require_non_empty(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::DeskError::validation(message));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<()> {
    let trimmed = value.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(crate::error::DeskError::validation(format!(
            "Adresse e-mail invalide : {}",
            value
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(amount_cents: i64) -> Result<()> {
    if amount_cents < 0 {
        return Err(crate::error::DeskError::validation(
            "Le montant ne peut pas être négatif",
        ));
    }
    Ok(())
}
