//! End-to-end tests of the back-office API through the full router.

use std::sync::Arc;

use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};

use ledgerdesk::records::{
    InvoiceStatus, PaymentMethodKind, PaymentStatus, SubscriberStatus, Ticket, TicketPriority,
};
use ledgerdesk::testing::fixtures::{invoice, payment, subscriber};
use ledgerdesk::testing::{self, DemoData};
use ledgerdesk::{
    AppState, InMemoryRepository, NoOpAuditLogger, PaymentConfigSettings, router,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ticket() -> Ticket {
    Ticket::new(
        "Facture en double",
        "alicebernard@example.fr",
        TicketPriority::High,
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    )
}

fn state_with(ticket: Ticket) -> AppState {
    let invoices = vec![
        invoice("FAC-1", "Alice Bernard", 10_000, InvoiceStatus::Paid, day(2024, 1, 5))
            .with_subscriptions(["Pro"]),
        invoice("FAC-2", "Bruno Caron", 5_000, InvoiceStatus::Pending, day(2024, 2, 10)),
        invoice("FAC-3", "Chloé Dubois", 7_500, InvoiceStatus::Paid, day(2024, 3, 15))
            .with_subscriptions(["Pro", "Support"]),
        invoice("FAC-4", "Alice Bernard", 2_500, InvoiceStatus::Overdue, day(2024, 4, 20)),
    ];
    let payments = vec![
        payment("PAY-1", "Alice Bernard", 10_000, PaymentMethodKind::Stripe, PaymentStatus::Succeeded, day(2024, 1, 6))
            .with_invoice_generated(true),
        payment("PAY-2", "Chloé Dubois", 7_500, PaymentMethodKind::BankTransfer, PaymentStatus::Failed, day(2024, 3, 16)),
    ];
    let subscribers = vec![
        subscriber("Alice Bernard", SubscriberStatus::Active),
        subscriber("Bruno Caron", SubscriberStatus::Trial),
        subscriber("Chloé Dubois", SubscriberStatus::Active),
    ];

    AppState::builder()
        .with_invoices(Arc::new(InMemoryRepository::seeded(invoices)))
        .with_payments(Arc::new(InMemoryRepository::seeded(payments)))
        .with_subscribers(Arc::new(InMemoryRepository::seeded(subscribers)))
        .with_tickets(Arc::new(InMemoryRepository::seeded([ticket])))
        .with_audit_logger(Arc::new(NoOpAuditLogger))
        .with_payment_settings(PaymentConfigSettings::instant())
        .build()
}

fn app() -> Router {
    router(state_with(ticket()))
}

fn numbers(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["number"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_invoices_default_sort_is_newest_first() {
    let body: Value = testing::get(app(), "/api/invoices")
        .execute()
        .await
        .assert_ok()
        .assert_json()
        .json()
        .await;

    assert_eq!(numbers(&body), vec!["FAC-4", "FAC-3", "FAC-2", "FAC-1"]);
    assert_eq!(body["data"]["pagination"]["total"], 4);
    assert_eq!(body["data"]["pagination"]["page"], 1);
    assert_eq!(body["data"]["tabs"][0]["code"], "all");
    assert_eq!(body["data"]["tabs"][0]["count"], 4);
}

#[tokio::test]
async fn test_invoices_filters_combine() {
    let body: Value = testing::get(app(), "/api/invoices")
        .with_query(&[
            ("search", "alice"),
            ("min_amount", "30"),
            ("sort", "amount"),
            ("order", "asc"),
        ])
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(numbers(&body), vec!["FAC-1"]);
}

#[tokio::test]
async fn test_tab_counts_ignore_selected_tab() {
    let body: Value = testing::get(app(), "/api/invoices")
        .with_query(&[("tab", "paid")])
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(numbers(&body), vec!["FAC-3", "FAC-1"]);
    let tabs = body["data"]["tabs"].as_array().unwrap();
    let overdue = tabs.iter().find(|t| t["code"] == "overdue").unwrap();
    assert_eq!(overdue["count"], 1);
    assert_eq!(overdue["label"], "En retard");
}

#[tokio::test]
async fn test_inverted_ranges_are_flagged_not_applied() {
    let body: Value = testing::get(app(), "/api/invoices")
        .with_query(&[("min_amount", "100"), ("max_amount", "10")])
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(body["data"]["amount_error"], true);
    assert_eq!(body["data"]["pagination"]["total"], 4);
}

#[tokio::test]
async fn test_column_filter_and_pagination() {
    let body: Value = testing::get(app(), "/api/invoices")
        .with_query(&[("col.status", "Payée"), ("per_page", "1"), ("page", "2")])
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(numbers(&body), vec!["FAC-1"]);
    assert_eq!(body["data"]["pagination"]["total_pages"], 2);
    assert_eq!(body["data"]["pagination"]["has_prev"], true);
    assert_eq!(body["data"]["pagination"]["has_next"], false);
}

#[tokio::test]
async fn test_relation_and_date_range_filters() {
    let body: Value = testing::get(app(), "/api/invoices")
        .with_query(&[("relations", "Support"), ("from", "2024-03-01"), ("to", "2024-03-31")])
        .execute()
        .await
        .assert_ok()
        .json()
        .await;
    assert_eq!(numbers(&body), vec!["FAC-3"]);
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    testing::get(app(), "/api/invoices")
        .with_query(&[("start_date", "demain")])
        .execute()
        .await
        .assert_bad_request();

    testing::get(app(), "/api/payments")
        .with_query(&[("per_page", "5000")])
        .execute()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_payment_boolean_column_filter() {
    let body: Value = testing::get(app(), "/api/payments")
        .with_query(&[("col.invoice_generated", "oui")])
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["reference"], "PAY-1");
}

#[tokio::test]
async fn test_subscribers_status_filter() {
    testing::get(app(), "/api/subscribers")
        .with_query(&[("status", "trial")])
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.pagination.total", json!(1))
        .await
        .assert_json_path("data.items.0.name", json!("Bruno Caron"))
        .await;
}

#[tokio::test]
async fn test_columns_metadata_lists_label_options() {
    let body: Value = testing::get(app(), "/api/payments/columns")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    let columns = body["data"].as_array().unwrap();
    let method = columns.iter().find(|c| c["id"] == "method").unwrap();
    assert_eq!(method["kind"], "label");
    assert_eq!(method["options"][1]["label"], "Carte bancaire");
}

#[tokio::test]
async fn test_export_returns_filtered_csv() {
    let response = testing::get(app(), "/api/invoices/export")
        .with_query(&[("status", "paid")])
        .execute()
        .await
        .assert_ok()
        .assert_header("content-type", "text/csv; charset=utf-8")
        .assert_header_contains("content-disposition", "invoices_export_");

    let csv = response.body_string().await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Numéro,"));
    assert!(lines[1].starts_with("FAC-3,"));
    assert!(lines[2].starts_with("FAC-1,"));
}

#[tokio::test]
async fn test_edit_invoice_validates_and_persists() {
    let app = app();
    let body: Value = testing::get(app.clone(), "/api/invoices")
        .with_query(&[("search", "FAC-2")])
        .execute()
        .await
        .json()
        .await;
    let id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    testing::patch(app.clone(), &format!("/api/invoices/{}", id))
        .json_body(&json!({ "amount_cents": -1 }))
        .execute()
        .await
        .assert_bad_request();

    testing::patch(app.clone(), &format!("/api/invoices/{}", id))
        .json_body(&json!({ "status": "paid" }))
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.status", json!("paid"))
        .await;

    testing::get(app, &format!("/api/invoices/{}", id))
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.status", json!("paid"))
        .await;
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    testing::get(app(), "/api/invoices/00000000-0000-0000-0000-000000000000")
        .execute()
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_payment_config_masks_and_keeps_secrets() {
    let app = app();
    let stripe = json!({
        "enabled": true,
        "test_mode": true,
        "publishable_key": "pk_test_abc",
        "secret_key": "sk_test_51Habcdef1234",
        "webhook_secret": "",
    });

    testing::put(app.clone(), "/api/payment-config/stripe")
        .json_body(&stripe)
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.secret_key", json!("sk_test_****1234"))
        .await;

    // Send back the masked view: the stored secret must survive.
    let mut masked = stripe.clone();
    masked["secret_key"] = json!("sk_test_****1234");
    testing::put(app.clone(), "/api/payment-config/stripe")
        .json_body(&masked)
        .execute()
        .await
        .assert_ok();

    testing::post(app.clone(), "/api/payment-config/stripe/test")
        .json_body(&masked)
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.success", json!(true))
        .await;

    testing::get(app, "/api/payment-config/stripe")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.secret_key", json!("sk_test_****1234"))
        .await;
}

#[tokio::test]
async fn test_invalid_payment_config_is_rejected() {
    testing::put(app(), "/api/payment-config/bank-transfer")
        .json_body(&json!({ "enabled": true, "account_holder": "ACME", "iban": "FR00 0000" }))
        .execute()
        .await
        .assert_bad_request();

    testing::get(app(), "/api/payment-config/credit-card")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.enabled", json!(false))
        .await;
}

#[tokio::test]
async fn test_support_board_and_moves() {
    let ticket = ticket();
    let app = router(state_with(ticket.clone()));

    testing::get(app.clone(), "/api/support/board")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.columns.0.status", json!("open"))
        .await
        .assert_json_path("data.columns.0.tickets.0.subject", json!("Facture en double"))
        .await;

    testing::post(app.clone(), &format!("/api/support/tickets/{}/move", ticket.id))
        .json_body(&json!({ "status": "resolved" }))
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.status", json!("resolved"))
        .await;

    testing::get(app, &format!("/api/support/tickets/{}", ticket.id))
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.status_label", json!("Résolu"))
        .await;
}

#[tokio::test]
async fn test_health_reports_repositories() {
    let body: Value = testing::get(app(), "/health")
        .execute()
        .await
        .assert_ok()
        .assert_header_contains("x-request-id", "-")
        .json()
        .await;

    assert_eq!(body["status"], "healthy");
    let names: Vec<&str> = body["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["application", "invoices", "payments", "subscribers", "tickets"]);
}

#[tokio::test]
async fn test_demo_data_serves() {
    let state = AppState::builder()
        .with_demo_data(DemoData::generate(3, 25))
        .with_audit_logger(Arc::new(NoOpAuditLogger))
        .build();

    testing::get(router(state), "/api/subscribers")
        .with_query(&[("per_page", "10")])
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.pagination.total", json!(25))
        .await
        .assert_json_path("data.pagination.total_pages", json!(3))
        .await;
}

#[tokio::test]
async fn test_subscriber_rename_reaches_invoices_and_payments() {
    let data = DemoData::generate(5, 10);
    let subscriber = data.subscribers[0].clone();
    let invoice_count = data
        .invoices
        .iter()
        .filter(|i| i.subscriber.id == subscriber.id)
        .count();
    let payment_count = data
        .payments
        .iter()
        .filter(|p| p.subscriber.id == subscriber.id)
        .count();
    assert!(invoice_count > 0);

    let state = AppState::builder()
        .with_demo_data(data)
        .with_audit_logger(Arc::new(NoOpAuditLogger))
        .build();
    let app = router(state);

    testing::patch(app.clone(), &format!("/api/subscribers/{}", subscriber.id))
        .json_body(&json!({ "name": "Zoé Renommée" }))
        .execute()
        .await
        .assert_ok();

    testing::get(app.clone(), "/api/invoices")
        .with_query(&[("search", "Renommée"), ("per_page", "100")])
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.pagination.total", json!(invoice_count))
        .await;
    testing::get(app, "/api/payments")
        .with_query(&[("search", "Renommée"), ("per_page", "100")])
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.pagination.total", json!(payment_count))
        .await;
}
