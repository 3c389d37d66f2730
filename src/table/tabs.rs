//! Status tabs: per-status counts, percentages and the tab filter.

use serde::Serialize;

use super::criteria::StatusFilter;
use super::schema::TableSchema;
use crate::records::LabeledEnum;

/// Share of `count` in `total`, as a percentage. Empty totals give `0.0`.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

/// Count rows per status, in the status enum's declaration order.
///
/// Every status is present, including those with no rows.
pub fn status_counts<S: TableSchema>(schema: &S, rows: &[S::Row]) -> Vec<(S::Status, usize)> {
    S::Status::ALL
        .iter()
        .map(|status| {
            let count = rows.iter().filter(|r| schema.status(r) == *status).count();
            (*status, count)
        })
        .collect()
}

/// Badge data for one status tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabSummary {
    /// Status code, or `all`.
    pub code: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

/// Tab summaries: an `all` tab followed by one tab per status.
pub fn tab_summaries<S: TableSchema>(schema: &S, rows: &[S::Row]) -> Vec<TabSummary> {
    let total = rows.len();
    let mut tabs = Vec::with_capacity(S::Status::ALL.len() + 1);
    tabs.push(TabSummary {
        code: "all",
        label: "Tous",
        count: total,
        percentage: percentage(total, total),
    });
    tabs.extend(
        status_counts(schema, rows)
            .into_iter()
            .map(|(status, count)| TabSummary {
                code: status.code(),
                label: status.label(),
                count,
                percentage: percentage(count, total),
            }),
    );
    tabs
}

/// Keep rows on the selected tab.
pub fn apply_status_tab<S: TableSchema>(
    schema: &S,
    rows: Vec<S::Row>,
    tab: StatusFilter<S::Status>,
) -> Vec<S::Row> {
    match tab {
        StatusFilter::All => rows,
        StatusFilter::Only(_) => rows
            .into_iter()
            .filter(|row| tab.matches(schema.status(row)))
            .collect(),
    }
}
