//! Payments received against invoices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LabeledEnum, Patch, Record, SubscriberRef, SubscriptionRef, require_non_negative};
use crate::error::Result;

/// Payment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Pending,
    Failed,
    Refunded,
}

impl LabeledEnum for PaymentStatus {
    const ALL: &'static [Self] = &[Self::Succeeded, Self::Pending, Self::Failed, Self::Refunded];

    fn code(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "Réussi",
            Self::Pending => "En cours",
            Self::Failed => "Échoué",
            Self::Refunded => "Remboursé",
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Stripe,
    CreditCard,
    BankTransfer,
}

impl LabeledEnum for PaymentMethodKind {
    const ALL: &'static [Self] = &[Self::Stripe, Self::CreditCard, Self::BankTransfer];

    fn code(&self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::CreditCard => "credit_card",
            Self::BankTransfer => "bank_transfer",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Stripe => "Stripe",
            Self::CreditCard => "Carte bancaire",
            Self::BankTransfer => "Virement bancaire",
        }
    }
}

/// A payment as listed in the payments table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    /// Processor or bank reference.
    pub reference: String,
    pub invoice_number: String,
    pub subscriber: SubscriberRef,
    pub amount_cents: i64,
    pub currency: String,
    pub method: PaymentMethodKind,
    pub status: PaymentStatus,
    pub paid_at: NaiveDate,
    /// Whether an invoice document was generated for this payment.
    pub invoice_generated: bool,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionRef>,
}

impl Payment {
    pub fn new(
        reference: impl Into<String>,
        subscriber: SubscriberRef,
        amount_cents: i64,
        method: PaymentMethodKind,
        status: PaymentStatus,
        paid_at: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference: reference.into(),
            invoice_number: String::new(),
            subscriber,
            amount_cents,
            currency: "eur".to_string(),
            method,
            status,
            paid_at,
            invoice_generated: false,
            subscriptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn for_invoice(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = invoice_number.into();
        self
    }

    #[must_use]
    pub fn with_invoice_generated(mut self, generated: bool) -> Self {
        self.invoice_generated = generated;
        self
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
}

impl Record for Payment {
    const ENTITY: &'static str = "payments";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Inline edit of a payment row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentPatch {
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub method: Option<PaymentMethodKind>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub invoice_generated: Option<bool>,
}

impl Patch<Payment> for PaymentPatch {
    fn apply_to(self, payment: &mut Payment) -> Result<()> {
        if let Some(amount) = self.amount_cents {
            require_non_negative(amount)?;
            payment.amount_cents = amount;
        }
        if let Some(status) = self.status {
            payment.status = status;
        }
        if let Some(method) = self.method {
            payment.method = method;
        }
        if let Some(generated) = self.invoice_generated {
            payment.invoice_generated = generated;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_codes_and_labels() {
        assert_eq!(PaymentMethodKind::CreditCard.code(), "credit_card");
        assert_eq!(PaymentMethodKind::BankTransfer.label(), "Virement bancaire");
        assert_eq!(
            PaymentMethodKind::from_code("stripe"),
            Some(PaymentMethodKind::Stripe)
        );
    }

    #[test]
    fn test_patch_marks_invoice_generated() {
        let mut payment = Payment::new(
            "pi_001",
            SubscriberRef::new("Paul Durand", "paul@example.fr"),
            4_900,
            PaymentMethodKind::Stripe,
            PaymentStatus::Succeeded,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        PaymentPatch {
            invoice_generated: Some(true),
            status: Some(PaymentStatus::Refunded),
            ..Default::default()
        }
        .apply_to(&mut payment)
        .unwrap();

        assert!(payment.invoice_generated);
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(payment.amount_cents, 4_900);
    }

    #[test]
    fn test_serde_uses_snake_case_codes() {
        let json = serde_json::to_string(&PaymentMethodKind::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
    }
}
