//! Record builders and deterministic demo data.
//!
//! The builders fill in everything a test does not care about. [`DemoData`]
//! generates a reproducible back-office population from a seed; the binary
//! uses it to populate the in-memory repositories.

use chrono::{Days, NaiveDate, TimeZone, Utc};

use crate::records::{
    BillingCycle, Invoice, InvoiceStatus, LabeledEnum, Payment, PaymentMethodKind, PaymentStatus,
    Subscriber, SubscriberRef, SubscriberStatus, Ticket, TicketPriority, TicketStatus,
};

/// Helpers for generating fake test values.
pub mod fake {
    /// Email derived from a display name: `Chloé Dubois` gives `chlodubois@example.fr`.
    pub fn email(name: &str) -> String {
        let local: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();
        format!("{}@example.fr", local)
    }

    /// Reference in the `PREFIX-000042` style.
    pub fn reference(prefix: &str, n: usize) -> String {
        format!("{}-{:06}", prefix, n)
    }
}

fn subscriber_ref(name: &str) -> SubscriberRef {
    SubscriberRef::new(name, fake::email(name))
}

/// Invoice for `subscriber_name` issued on `issue_date`.
pub fn invoice(
    number: &str,
    subscriber_name: &str,
    amount_cents: i64,
    status: InvoiceStatus,
    issue_date: NaiveDate,
) -> Invoice {
    Invoice::new(
        number,
        subscriber_ref(subscriber_name),
        amount_cents,
        status,
        issue_date,
    )
}

/// Payment for `subscriber_name`, linked to no invoice.
pub fn payment(
    reference: &str,
    subscriber_name: &str,
    amount_cents: i64,
    method: PaymentMethodKind,
    status: PaymentStatus,
    paid_at: NaiveDate,
) -> Payment {
    Payment::new(
        reference,
        subscriber_ref(subscriber_name),
        amount_cents,
        method,
        status,
        paid_at,
    )
}

/// Monthly subscriber who joined on 2024-01-01.
pub fn subscriber(name: &str, status: SubscriberStatus) -> Subscriber {
    let joined = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    Subscriber::new(name, fake::email(name), status, BillingCycle::Monthly, joined)
}

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chloé", "David", "Élodie", "François", "Gaëlle", "Hugo", "Inès", "Julien",
    "Karine", "Léo", "Manon", "Nicolas", "Océane", "Pierre",
];

const LAST_NAMES: &[&str] = &[
    "Bernard", "Caron", "Dubois", "Petit", "Moreau", "Laurent", "Simon", "Michel", "Lefèvre",
    "Garcia", "Roux", "Fournier",
];

const COMPANIES: &[&str] = &[
    "Atelier Nord",
    "Boulangerie du Port",
    "Cabinet Lumière",
    "Dupont & Fils",
    "Éditions Azur",
];

const PLANS: &[(&str, i64)] = &[
    ("Starter", 1_900),
    ("Pro", 4_900),
    ("Business", 9_900),
    ("Support", 2_500),
];

const TICKET_SUBJECTS: &[&str] = &[
    "Facture en double",
    "Changement de moyen de paiement",
    "Remboursement demandé",
    "Impossible de télécharger la facture",
    "Passage à l'offre annuelle",
    "Erreur sur le montant prélevé",
    "Suppression du compte",
    "Question sur la TVA",
];

/// A reproducible back-office population.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub subscribers: Vec<Subscriber>,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<Payment>,
    pub tickets: Vec<Ticket>,
}

impl DemoData {
    /// Generate `subscriber_count` subscribers with their invoices, payments
    /// and tickets. The same seed always gives the same data, apart from ids.
    pub fn generate(seed: u64, subscriber_count: usize) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();

        let mut data = Self {
            subscribers: Vec::with_capacity(subscriber_count),
            invoices: Vec::new(),
            payments: Vec::new(),
            tickets: Vec::new(),
        };

        for n in 0..subscriber_count {
            let name = format!(
                "{} {}",
                FIRST_NAMES[rng.usize(..FIRST_NAMES.len())],
                LAST_NAMES[rng.usize(..LAST_NAMES.len())]
            );
            let status = pick(&mut rng, SubscriberStatus::ALL);
            let cycle = pick(&mut rng, BillingCycle::ALL);
            let joined = origin + Days::new(rng.u64(0..300));

            let plan_count = rng.usize(1..=2);
            let mut plans: Vec<(&str, i64)> = Vec::with_capacity(plan_count);
            for _ in 0..plan_count {
                let plan = PLANS[rng.usize(..PLANS.len())];
                if !plans.contains(&plan) {
                    plans.push(plan);
                }
            }
            let titles: Vec<&str> = plans.iter().map(|(title, _)| *title).collect();
            let monthly: i64 = plans.iter().map(|(_, price)| price).sum();

            let mut subscriber = Subscriber::new(
                name.as_str(),
                format!("{}{}", n, fake::email(&name)),
                status,
                cycle,
                joined,
            )
            .with_monthly_amount(monthly)
            .with_subscriptions(titles.iter().copied());
            if rng.bool() {
                subscriber = subscriber.with_company(COMPANIES[rng.usize(..COMPANIES.len())]);
            }

            for _ in 0..rng.usize(1..=3) {
                let number = fake::reference("FAC", data.invoices.len() + 1);
                let issued = joined + Days::new(rng.u64(0..120));
                let invoice_status = pick(&mut rng, InvoiceStatus::ALL);
                let invoice = Invoice::new(
                    number.as_str(),
                    SubscriberRef::from(&subscriber),
                    monthly,
                    invoice_status,
                    issued,
                )
                .with_subscriptions(titles.iter().copied());

                if matches!(invoice_status, InvoiceStatus::Paid | InvoiceStatus::Overdue) {
                    let paid_at = issued + Days::new(rng.u64(0..30));
                    let payment_status = if invoice_status == InvoiceStatus::Paid {
                        PaymentStatus::Succeeded
                    } else {
                        pick(&mut rng, &[PaymentStatus::Failed, PaymentStatus::Pending])
                    };
                    let payment = Payment::new(
                        fake::reference("PAY", data.payments.len() + 1),
                        SubscriberRef::from(&subscriber),
                        monthly,
                        pick(&mut rng, PaymentMethodKind::ALL),
                        payment_status,
                        paid_at,
                    )
                    .for_invoice(number.as_str())
                    .with_invoice_generated(payment_status == PaymentStatus::Succeeded)
                    .with_subscriptions(titles.iter().copied());
                    data.payments.push(payment);
                }
                data.invoices.push(invoice);
            }

            if rng.usize(..3) == 0 {
                let created = Utc
                    .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
                    .single()
                    .unwrap_or_default()
                    + chrono::Duration::hours(rng.i64(0..24 * 60));
                let ticket = Ticket::new(
                    TICKET_SUBJECTS[rng.usize(..TICKET_SUBJECTS.len())],
                    subscriber.email.as_str(),
                    pick(&mut rng, TicketPriority::ALL),
                    created,
                )
                .with_status(pick(&mut rng, TicketStatus::ALL));
                data.tickets.push(ticket);
            }

            data.subscribers.push(subscriber);
        }
        data
    }
}

fn pick<T: Copy>(rng: &mut fastrand::Rng, options: &[T]) -> T {
    options[rng.usize(..options.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_slugified() {
        assert_eq!(fake::email("Chloé Dubois"), "chlodubois@example.fr");
        assert_eq!(fake::email("Jean-Luc O'Neil"), "jeanluconeil@example.fr");
    }

    #[test]
    fn test_demo_data_is_reproducible() {
        let a = DemoData::generate(7, 20);
        let b = DemoData::generate(7, 20);

        assert_eq!(a.subscribers.len(), 20);
        let names = |d: &DemoData| d.subscribers.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&a), names(&b));
        assert_eq!(a.invoices.len(), b.invoices.len());
        assert_eq!(a.payments.len(), b.payments.len());
    }

    #[test]
    fn test_demo_payments_reference_existing_invoices() {
        let data = DemoData::generate(42, 30);
        assert!(!data.invoices.is_empty());
        for payment in &data.payments {
            assert!(data.invoices.iter().any(|i| i.number == payment.invoice_number));
        }
        for subscriber in &data.subscribers {
            assert!(!subscriber.subscriptions.is_empty());
        }
    }

    #[test]
    fn test_demo_subscribers_pay_each_plan_once() {
        for seed in 0..20 {
            let data = DemoData::generate(seed, 40);
            for subscriber in &data.subscribers {
                let mut titles: Vec<&str> =
                    subscriber.subscriptions.iter().map(|s| s.title.as_str()).collect();
                let count = titles.len();
                titles.sort_unstable();
                titles.dedup();
                assert_eq!(titles.len(), count);

                let expected: i64 = PLANS
                    .iter()
                    .filter(|(title, _)| titles.contains(title))
                    .map(|(_, price)| price)
                    .sum();
                assert_eq!(subscriber.monthly_amount_cents, expected);
            }
        }
    }
}
