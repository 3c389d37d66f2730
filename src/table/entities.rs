//! Table schemas for invoices, payments and subscribers.

use chrono::NaiveDate;

use super::labels::LabelTable;
use super::schema::{ColumnDef, ColumnKind, ColumnValue, SortSpec, TableSchema};
use crate::records::{
    BillingCycle, Invoice, InvoiceStatus, LabeledEnum, Payment, PaymentMethodKind, PaymentStatus,
    Subscriber, SubscriberStatus, SubscriptionRef,
};

fn titles(subscriptions: &[SubscriptionRef]) -> Vec<&str> {
    subscriptions.iter().map(|s| s.title.as_str()).collect()
}

fn joined_titles(subscriptions: &[SubscriptionRef]) -> ColumnValue {
    ColumnValue::Text(titles(subscriptions).join(", "))
}

fn label<E: LabeledEnum>() -> ColumnKind {
    ColumnKind::Label(LabelTable::from_enum::<E>())
}

/// Invoices table.
#[derive(Debug)]
pub struct InvoiceTable {
    columns: Vec<ColumnDef<Invoice>>,
}

impl InvoiceTable {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef::new("number", "Numéro", ColumnKind::Text, |i: &Invoice| {
                    ColumnValue::Text(i.number.clone())
                }),
                ColumnDef::new("subscriber", "Abonné", ColumnKind::Text, |i: &Invoice| {
                    ColumnValue::Text(i.subscriber.name.clone())
                }),
                ColumnDef::new("amount", "Montant", ColumnKind::Amount, |i: &Invoice| {
                    ColumnValue::Amount(i.amount_cents)
                }),
                ColumnDef::new("status", "Statut", label::<InvoiceStatus>(), |i: &Invoice| {
                    ColumnValue::Code(i.status.code())
                }),
                ColumnDef::new("issue_date", "Date d'émission", ColumnKind::Date, |i: &Invoice| {
                    ColumnValue::Date(i.issue_date)
                }),
                ColumnDef::new("due_date", "Date d'échéance", ColumnKind::Date, |i: &Invoice| {
                    ColumnValue::Date(i.due_date)
                }),
                ColumnDef::new("subscriptions", "Abonnements", ColumnKind::Text, |i: &Invoice| {
                    joined_titles(&i.subscriptions)
                })
                .unsortable(),
            ],
        }
    }
}

impl Default for InvoiceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSchema for InvoiceTable {
    type Row = Invoice;
    type Status = InvoiceStatus;

    fn search_fields<'r>(&self, row: &'r Invoice) -> Vec<&'r str> {
        vec![
            row.number.as_str(),
            row.subscriber.name.as_str(),
            row.subscriber.email.as_str(),
        ]
    }

    fn status(&self, row: &Invoice) -> InvoiceStatus {
        row.status
    }

    fn amount(&self, row: &Invoice) -> i64 {
        row.amount_cents
    }

    fn date(&self, row: &Invoice) -> NaiveDate {
        row.issue_date
    }

    fn relation_titles<'r>(&self, row: &'r Invoice) -> Vec<&'r str> {
        titles(&row.subscriptions)
    }

    fn columns(&self) -> &[ColumnDef<Invoice>] {
        &self.columns
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::desc("issue_date")
    }
}

/// Payments table.
#[derive(Debug)]
pub struct PaymentTable {
    columns: Vec<ColumnDef<Payment>>,
}

impl PaymentTable {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef::new("reference", "Référence", ColumnKind::Text, |p: &Payment| {
                    ColumnValue::Text(p.reference.clone())
                }),
                ColumnDef::new("invoice_number", "Facture", ColumnKind::Text, |p: &Payment| {
                    ColumnValue::Text(p.invoice_number.clone())
                }),
                ColumnDef::new("subscriber", "Abonné", ColumnKind::Text, |p: &Payment| {
                    ColumnValue::Text(p.subscriber.name.clone())
                }),
                ColumnDef::new("amount", "Montant", ColumnKind::Amount, |p: &Payment| {
                    ColumnValue::Amount(p.amount_cents)
                }),
                ColumnDef::new("method", "Moyen de paiement", label::<PaymentMethodKind>(), |p: &Payment| {
                    ColumnValue::Code(p.method.code())
                }),
                ColumnDef::new("status", "Statut", label::<PaymentStatus>(), |p: &Payment| {
                    ColumnValue::Code(p.status.code())
                }),
                ColumnDef::new("paid_at", "Date de paiement", ColumnKind::Date, |p: &Payment| {
                    ColumnValue::Date(p.paid_at)
                }),
                ColumnDef::new("invoice_generated", "Facture générée", ColumnKind::Boolean, |p: &Payment| {
                    ColumnValue::Bool(p.invoice_generated)
                }),
            ],
        }
    }
}

impl Default for PaymentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSchema for PaymentTable {
    type Row = Payment;
    type Status = PaymentStatus;

    fn search_fields<'r>(&self, row: &'r Payment) -> Vec<&'r str> {
        vec![
            row.reference.as_str(),
            row.invoice_number.as_str(),
            row.subscriber.name.as_str(),
        ]
    }

    fn status(&self, row: &Payment) -> PaymentStatus {
        row.status
    }

    fn amount(&self, row: &Payment) -> i64 {
        row.amount_cents
    }

    fn date(&self, row: &Payment) -> NaiveDate {
        row.paid_at
    }

    fn relation_titles<'r>(&self, row: &'r Payment) -> Vec<&'r str> {
        titles(&row.subscriptions)
    }

    fn columns(&self) -> &[ColumnDef<Payment>] {
        &self.columns
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::desc("paid_at")
    }
}

/// Subscribers table.
#[derive(Debug)]
pub struct SubscriberTable {
    columns: Vec<ColumnDef<Subscriber>>,
}

impl SubscriberTable {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef::new("name", "Nom", ColumnKind::Text, |s: &Subscriber| {
                    ColumnValue::Text(s.name.clone())
                }),
                ColumnDef::new("email", "E-mail", ColumnKind::Text, |s: &Subscriber| {
                    ColumnValue::Text(s.email.clone())
                }),
                ColumnDef::new("company", "Société", ColumnKind::Text, |s: &Subscriber| {
                    ColumnValue::Text(s.company.clone().unwrap_or_default())
                }),
                ColumnDef::new("status", "Statut", label::<SubscriberStatus>(), |s: &Subscriber| {
                    ColumnValue::Code(s.status.code())
                }),
                ColumnDef::new("billing_cycle", "Facturation", label::<BillingCycle>(), |s: &Subscriber| {
                    ColumnValue::Code(s.billing_cycle.code())
                }),
                ColumnDef::new("monthly_amount", "Montant mensuel", ColumnKind::Amount, |s: &Subscriber| {
                    ColumnValue::Amount(s.monthly_amount_cents)
                }),
                ColumnDef::new("joined_at", "Inscription", ColumnKind::Date, |s: &Subscriber| {
                    ColumnValue::Date(s.joined_at)
                }),
                ColumnDef::new("subscriptions", "Abonnements", ColumnKind::Text, |s: &Subscriber| {
                    joined_titles(&s.subscriptions)
                })
                .unsortable(),
            ],
        }
    }
}

impl Default for SubscriberTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSchema for SubscriberTable {
    type Row = Subscriber;
    type Status = SubscriberStatus;

    fn search_fields<'r>(&self, row: &'r Subscriber) -> Vec<&'r str> {
        let mut fields = vec![row.name.as_str(), row.email.as_str()];
        if let Some(company) = &row.company {
            fields.push(company.as_str());
        }
        fields
    }

    fn status(&self, row: &Subscriber) -> SubscriberStatus {
        row.status
    }

    fn amount(&self, row: &Subscriber) -> i64 {
        row.monthly_amount_cents
    }

    fn date(&self, row: &Subscriber) -> NaiveDate {
        row.joined_at
    }

    fn relation_titles<'r>(&self, row: &'r Subscriber) -> Vec<&'r str> {
        titles(&row.subscriptions)
    }

    fn columns(&self) -> &[ColumnDef<Subscriber>] {
        &self.columns
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::asc("name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_columns_exist_and_are_sortable() {
        let invoice = InvoiceTable::new();
        let payment = PaymentTable::new();
        let subscriber = SubscriberTable::new();
        assert!(invoice.column(&invoice.default_sort().column).unwrap().sortable);
        assert!(payment.column(&payment.default_sort().column).unwrap().sortable);
        assert!(subscriber.column(&subscriber.default_sort().column).unwrap().sortable);
    }

    #[test]
    fn test_label_columns_cover_every_variant() {
        let payment = PaymentTable::new();
        let method = payment.column("method").and_then(|c| c.labels()).unwrap();
        assert_eq!(method.len(), PaymentMethodKind::ALL.len());

        let subscriber = SubscriberTable::new();
        let cycle = subscriber.column("billing_cycle").and_then(|c| c.labels()).unwrap();
        assert_eq!(cycle.resolve("trimestriel"), Some("quarterly"));
    }

    #[test]
    fn test_column_ids_are_unique() {
        let ids: Vec<&str> = PaymentTable::new().columns().iter().map(|c| c.id).collect();
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
    }
}
