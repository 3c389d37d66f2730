//! Primary filter and sort stage.

use std::cmp::Ordering;

use super::criteria::{DateWindow, FilterCriteria};
use super::schema::{SortSpec, TableSchema};

/// Comparator for `sort` over the schema's rows.
pub fn comparator<'a, S: TableSchema>(
    schema: &'a S,
    sort: &'a SortSpec,
) -> impl Fn(&S::Row, &S::Row) -> Ordering + 'a {
    move |a, b| schema.compare(sort, a, b)
}

/// Sort rows with `compare`, breaking ties by original index.
pub fn stable_sort<R, F>(rows: &[R], compare: F) -> Vec<&R>
where
    F: Fn(&R, &R) -> Ordering,
{
    let mut indexed: Vec<(usize, &R)> = rows.iter().enumerate().collect();
    indexed.sort_by(|a, b| compare(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    indexed.into_iter().map(|(_, row)| row).collect()
}

/// Sort and filter `rows` by `criteria`.
///
/// Returns a new vector; the source slice is untouched. A row survives when
/// it passes every active criterion. `date_error` and `amount_error` are
/// computed by the caller (see [`FilterCriteria::date_error`]) and skip the
/// corresponding filter instead of excluding rows.
pub fn apply_filter<S, F>(
    schema: &S,
    rows: &[S::Row],
    compare: F,
    criteria: &FilterCriteria<S::Status>,
    date_error: bool,
    amount_error: bool,
) -> Vec<S::Row>
where
    S: TableSchema,
    F: Fn(&S::Row, &S::Row) -> Ordering,
{
    let name = criteria.name_query();
    let relations = criteria.active_relations();
    let dates = DateWindow::new(criteria.start_date, criteria.end_date);

    let filtered: Vec<S::Row> = stable_sort(rows, compare)
        .into_iter()
        .filter(|row| match &name {
            Some(query) => schema
                .search_fields(row)
                .iter()
                .any(|field| field.to_lowercase().contains(query.as_str())),
            None => true,
        })
        .filter(|row| criteria.status.matches(schema.status(row)))
        .filter(|row| {
            relations.is_empty()
                || schema
                    .relation_titles(row)
                    .iter()
                    .any(|title| relations.contains(title))
        })
        .filter(|row| {
            if amount_error {
                return true;
            }
            let amount = schema.amount(row);
            criteria.min_amount.is_none_or(|min| amount >= min)
                && criteria.max_amount.is_none_or(|max| amount <= max)
        })
        .filter(|row| date_error || dates.contains(schema.date(row)))
        .cloned()
        .collect();

    tracing::trace!(
        target: "ledgerdesk::table",
        input = rows.len(),
        output = filtered.len(),
        "primary filter applied"
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InvoiceStatus, LabeledEnum};
    use crate::table::entities::InvoiceTable;
    use crate::testing::fixtures::invoice;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(
        rows: &[crate::records::Invoice],
        criteria: &FilterCriteria<InvoiceStatus>,
    ) -> Vec<crate::records::Invoice> {
        let schema = InvoiceTable::new();
        let sort = SortSpec::asc("amount");
        apply_filter(
            &schema,
            rows,
            comparator(&schema, &sort),
            criteria,
            criteria.date_error(),
            criteria.amount_error(),
        )
    }

    fn sample() -> Vec<crate::records::Invoice> {
        vec![
            invoice("FAC-1", "Alice Bernard", 10_000, InvoiceStatus::Paid, day(2024, 1, 5)),
            invoice("FAC-2", "Bruno Caron", 5_000, InvoiceStatus::Pending, day(2024, 2, 10)),
            invoice("FAC-3", "Chloé Dubois", 7_500, InvoiceStatus::Paid, day(2024, 3, 15))
                .with_subscriptions(["Pro"]),
            invoice("FAC-4", "Alice Bernard", 5_000, InvoiceStatus::Overdue, day(2024, 4, 20))
                .with_subscriptions(["Starter", "Support"]),
        ]
    }

    fn numbers(rows: &[crate::records::Invoice]) -> Vec<&str> {
        rows.iter().map(|r| r.number.as_str()).collect()
    }

    #[test]
    fn test_empty_criteria_returns_sorted_set() {
        let rows = sample();
        let out = run(&rows, &FilterCriteria::new());
        assert_eq!(numbers(&out), vec!["FAC-2", "FAC-4", "FAC-3", "FAC-1"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let rows = sample();
        let out = run(&rows, &FilterCriteria::new());
        // FAC-2 and FAC-4 share amount 5000 and keep input order.
        let pos2 = out.iter().position(|r| r.number == "FAC-2").unwrap();
        let pos4 = out.iter().position(|r| r.number == "FAC-4").unwrap();
        assert!(pos2 < pos4);
    }

    #[test]
    fn test_descending_keeps_ties_in_input_order() {
        let rows = sample();
        let schema = InvoiceTable::new();
        let sort = SortSpec::desc("amount");
        let out = apply_filter(
            &schema,
            &rows,
            comparator(&schema, &sort),
            &FilterCriteria::new(),
            false,
            false,
        );
        assert_eq!(numbers(&out), vec!["FAC-1", "FAC-3", "FAC-2", "FAC-4"]);
    }

    #[test]
    fn test_name_matches_any_search_field() {
        let rows = sample();
        let by_subscriber = run(&rows, &FilterCriteria::new().with_name("alice"));
        assert_eq!(numbers(&by_subscriber), vec!["FAC-4", "FAC-1"]);

        let by_number = run(&rows, &FilterCriteria::new().with_name("fac-3"));
        assert_eq!(numbers(&by_number), vec!["FAC-3"]);
    }

    #[test]
    fn test_status_subset_of_all() {
        let rows = sample();
        let all = run(&rows, &FilterCriteria::new());
        let paid = run(&rows, &FilterCriteria::new().with_status(InvoiceStatus::Paid));
        assert!(paid.iter().all(|r| r.status == InvoiceStatus::Paid));
        assert!(paid.iter().all(|r| all.contains(r)));
        assert_eq!(paid.len(), 2);
    }

    #[test]
    fn test_relation_filter_any_title() {
        let rows = sample();
        let out = run(&rows, &FilterCriteria::new().with_relations(["Support", "Enterprise"]));
        assert_eq!(numbers(&out), vec!["FAC-4"]);

        let out = run(&rows, &FilterCriteria::new().with_relations(Vec::<String>::new()));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_amount_bounds_inclusive() {
        let rows = sample();
        let min_only = run(&rows, &FilterCriteria::new().with_amount_range(Some(7_500), None));
        assert_eq!(numbers(&min_only), vec!["FAC-3", "FAC-1"]);

        let max_only = run(&rows, &FilterCriteria::new().with_amount_range(None, Some(5_000)));
        assert_eq!(numbers(&max_only), vec!["FAC-2", "FAC-4"]);

        let both = run(
            &rows,
            &FilterCriteria::new().with_amount_range(Some(5_000), Some(7_500)),
        );
        assert_eq!(numbers(&both), vec!["FAC-2", "FAC-4", "FAC-3"]);
    }

    #[test]
    fn test_amount_error_skips_amount_filter() {
        let rows = sample();
        let inverted = FilterCriteria::new().with_amount_range(Some(10_000), Some(5_000));
        assert!(inverted.amount_error());
        assert_eq!(run(&rows, &inverted), run(&rows, &FilterCriteria::new()));
    }

    #[test]
    fn test_date_error_skips_date_filter() {
        let rows = sample();
        let inverted = FilterCriteria::new()
            .with_start_date(day(2024, 3, 1))
            .with_end_date(day(2024, 1, 1));
        assert_eq!(run(&rows, &inverted).len(), 4);

        let window = FilterCriteria::new()
            .with_start_date(day(2024, 2, 10))
            .with_end_date(day(2024, 3, 15));
        assert_eq!(numbers(&run(&rows, &window)), vec!["FAC-2", "FAC-3"]);
    }

    #[test]
    fn test_source_rows_untouched() {
        let rows = sample();
        let before = rows.clone();
        let _ = run(&rows, &FilterCriteria::new().with_status(InvoiceStatus::Paid));
        assert_eq!(rows, before);
    }

    proptest! {
        #[test]
        fn prop_stable_sort_preserves_input_order_for_equal_keys(
            keys in proptest::collection::vec(0u8..4, 0..64)
        ) {
            let rows: Vec<(u8, usize)> = keys.iter().copied().zip(0..).collect();
            let sorted = stable_sort(&rows, |a, b| a.0.cmp(&b.0));
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].0 <= pair[1].0);
                if pair[0].0 == pair[1].0 {
                    prop_assert!(pair[0].1 < pair[1].1);
                }
            }
            prop_assert_eq!(sorted.len(), rows.len());
        }

        #[test]
        fn prop_status_filter_is_subset(status_index in 0usize..5) {
            let rows = sample();
            let status = InvoiceStatus::ALL[status_index];
            let all = run(&rows, &FilterCriteria::new());
            let only = run(&rows, &FilterCriteria::new().with_status(status));
            prop_assert!(only.iter().all(|r| r.status == status && all.contains(r)));
        }
    }
}
