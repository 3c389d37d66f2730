//! Table view state and the full recomputation pipeline.

use chrono::NaiveDate;
use serde::Serialize;

use super::columns::{ColumnFilters, apply_column_filters};
use super::criteria::{DateWindow, FilterCriteria, StatusFilter};
use super::date_range::apply_date_range;
use super::filter::{apply_filter, comparator};
use super::pager::{Page, PageWindow, paginate};
use super::schema::{SortSpec, TableSchema};
use super::tabs::{TabSummary, apply_status_tab, tab_summaries};

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot<R> {
    pub page: Page<R>,
    pub tabs: Vec<TabSummary>,
    /// Start date after end date; the date filter was skipped.
    pub date_error: bool,
    /// Minimum above maximum; the amount filter was skipped.
    pub amount_error: bool,
}

/// Filter, sort and paging state of one table.
///
/// Every call to [`TableView::compute`] reruns the whole pipeline:
/// primary filter and sort, status tab, column filters, date range, page.
#[derive(Debug)]
pub struct TableView<S: TableSchema> {
    schema: S,
    criteria: FilterCriteria<S::Status>,
    column_filters: ColumnFilters,
    date_window: DateWindow,
    tab: StatusFilter<S::Status>,
    sort: SortSpec,
    window: PageWindow,
}

impl<S: TableSchema> TableView<S> {
    pub fn new(schema: S, rows_per_page: usize) -> Self {
        let sort = schema.default_sort();
        Self {
            schema,
            criteria: FilterCriteria::default(),
            column_filters: ColumnFilters::default(),
            date_window: DateWindow::default(),
            tab: StatusFilter::All,
            sort,
            window: PageWindow::first(rows_per_page),
        }
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn criteria(&self) -> &FilterCriteria<S::Status> {
        &self.criteria
    }

    pub fn column_filters(&self) -> &ColumnFilters {
        &self.column_filters
    }

    pub fn tab(&self) -> StatusFilter<S::Status> {
        self.tab
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn date_window(&self) -> DateWindow {
        self.date_window
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria<S::Status>) {
        self.criteria = criteria;
        self.window.page = 0;
    }

    pub fn set_column_filter(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.column_filters.set(column, value);
        self.window.page = 0;
    }

    pub fn set_column_filters(&mut self, filters: ColumnFilters) {
        self.column_filters = filters;
        self.window.page = 0;
    }

    /// Select a status tab. Clears column filters and returns to the first page.
    pub fn set_tab(&mut self, tab: StatusFilter<S::Status>) {
        if self.tab != tab {
            self.column_filters.clear();
        }
        self.tab = tab;
        self.window.page = 0;
    }

    pub fn set_date_window(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.date_window = DateWindow::new(start, end);
        self.window.page = 0;
    }

    /// Sort by a column. Unsortable or unknown columns are ignored.
    pub fn set_sort(&mut self, sort: SortSpec) {
        match self.schema.column(&sort.column) {
            Some(column) if column.sortable => self.sort = sort,
            _ => {
                tracing::debug!(
                    target: "ledgerdesk::table",
                    column = %sort.column,
                    "ignoring sort on unsortable column"
                );
            }
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.window.page = page;
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.window = PageWindow::first(rows_per_page);
    }

    pub fn reset_column_filters(&mut self) {
        self.column_filters.clear();
        self.window.page = 0;
    }

    /// Back to empty criteria, no column or date filters, the `all` tab.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.column_filters.clear();
        self.date_window = DateWindow::default();
        self.tab = StatusFilter::All;
        self.window.page = 0;
    }

    /// Primary filter and sort output, before the tab. Tab badges count this set.
    fn base(&self, rows: &[S::Row]) -> Vec<S::Row> {
        apply_filter(
            &self.schema,
            rows,
            comparator(&self.schema, &self.sort),
            &self.criteria,
            self.criteria.date_error(),
            self.criteria.amount_error(),
        )
    }

    fn narrow(&self, base: Vec<S::Row>) -> Vec<S::Row> {
        let tabbed = apply_status_tab(&self.schema, base, self.tab);
        let by_column = apply_column_filters(&self.schema, tabbed, &self.column_filters);
        apply_date_range(by_column, self.date_window.start, self.date_window.end, |row| {
            self.schema.date(row)
        })
    }

    /// Every row passing all stages, in sorted order. Used for exports.
    pub fn filtered(&self, rows: &[S::Row]) -> Vec<S::Row> {
        self.narrow(self.base(rows))
    }

    /// Run the pipeline over `rows`.
    pub fn compute(&self, rows: &[S::Row]) -> TableSnapshot<S::Row> {
        let base = self.base(rows);
        let tabs = tab_summaries(&self.schema, &base);
        let base_len = base.len();
        let filtered = self.narrow(base);
        let page = paginate(&filtered, self.window);

        tracing::debug!(
            target: "ledgerdesk::table",
            rows = rows.len(),
            base = base_len,
            filtered = filtered.len(),
            page = page.page,
            page_items = page.items.len(),
            "table recomputed"
        );

        TableSnapshot {
            page,
            tabs,
            date_error: self.criteria.date_error(),
            amount_error: self.criteria.amount_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Invoice, InvoiceStatus, PaymentStatus};
    use crate::table::entities::{InvoiceTable, PaymentTable};
    use crate::testing::fixtures::{invoice, payment};
    use crate::records::PaymentMethodKind;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_rows() -> Vec<Invoice> {
        vec![
            invoice("FAC-1", "Alice Bernard", 100, InvoiceStatus::Paid, day(2024, 1, 5)),
            invoice("FAC-2", "Bruno Caron", 50, InvoiceStatus::Pending, day(2024, 2, 10)),
        ]
    }

    #[test]
    fn test_status_then_start_date_scenario() {
        let rows = two_rows();
        let mut view = TableView::new(InvoiceTable::new(), 10);

        view.set_criteria(FilterCriteria::new().with_status(InvoiceStatus::Paid));
        let items = view.compute(&rows).page.items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].number, "FAC-1");

        view.set_criteria(
            FilterCriteria::new()
                .with_status(InvoiceStatus::Paid)
                .with_start_date(day(2024, 2, 1)),
        );
        assert!(view.compute(&rows).page.items.is_empty());
    }

    #[test]
    fn test_total_reflects_filtered_set_not_page() {
        let rows: Vec<Invoice> = (0..23)
            .map(|n| {
                invoice(
                    &format!("FAC-{n:02}"),
                    "Alice Bernard",
                    1_000 + n,
                    InvoiceStatus::Paid,
                    day(2024, 1, 1),
                )
            })
            .collect();
        let mut view = TableView::new(InvoiceTable::new(), 10);
        view.set_page(2);
        let snapshot = view.compute(&rows);
        assert_eq!(snapshot.page.items.len(), 3);
        assert_eq!(snapshot.page.total, 23);
        assert_eq!(snapshot.page.total_pages, 3);
    }

    #[test]
    fn test_tab_change_resets_column_filters_and_page() {
        let mut view = TableView::new(PaymentTable::new(), 10);
        view.set_column_filter("method", "stripe");
        view.set_page(3);

        view.set_tab(StatusFilter::Only(PaymentStatus::Failed));
        assert!(view.column_filters().is_empty());
        assert_eq!(view.window().page, 0);
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let mut view = TableView::new(InvoiceTable::new(), 10);
        view.set_page(4);
        view.set_criteria(FilterCriteria::new().with_name("fac"));
        assert_eq!(view.window().page, 0);
    }

    #[test]
    fn test_tabs_count_base_set() {
        let rows = two_rows();
        let mut view = TableView::new(InvoiceTable::new(), 10);
        view.set_tab(StatusFilter::Only(InvoiceStatus::Paid));
        let snapshot = view.compute(&rows);
        assert_eq!(snapshot.page.total, 1);
        // the all tab still counts both rows
        assert_eq!(snapshot.tabs[0].count, 2);
        let paid = snapshot.tabs.iter().find(|t| t.code == "paid").unwrap();
        assert_eq!(paid.percentage, 50.0);
    }

    #[test]
    fn test_tabs_on_empty_rows_have_zero_percent() {
        let view = TableView::new(InvoiceTable::new(), 10);
        let snapshot = view.compute(&[]);
        assert!(snapshot.tabs.iter().all(|t| t.percentage == 0.0));
    }

    #[test]
    fn test_date_window_stage() {
        let rows = two_rows();
        let mut view = TableView::new(InvoiceTable::new(), 10);
        view.set_date_window(Some(day(2024, 2, 1)), None);
        let items = view.filtered(&rows);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].number, "FAC-2");
    }

    #[test]
    fn test_unsortable_column_keeps_previous_sort() {
        let mut view = TableView::new(InvoiceTable::new(), 10);
        view.set_sort(SortSpec::asc("subscriptions"));
        assert_eq!(view.sort(), &SortSpec::desc("issue_date"));
        view.set_sort(SortSpec::asc("amount"));
        assert_eq!(view.sort(), &SortSpec::asc("amount"));
    }

    #[test]
    fn test_error_flags_reported() {
        let rows = two_rows();
        let mut view = TableView::new(InvoiceTable::new(), 10);
        view.set_criteria(FilterCriteria::new().with_amount_range(Some(100), Some(50)));
        let snapshot = view.compute(&rows);
        assert!(snapshot.amount_error);
        assert_eq!(snapshot.page.total, 2);
    }

    #[test]
    fn test_reset_filters() {
        let mut view = TableView::new(PaymentTable::new(), 10);
        view.set_criteria(FilterCriteria::new().with_name("x"));
        view.set_tab(StatusFilter::Only(PaymentStatus::Pending));
        view.set_column_filter("invoice_generated", "oui");
        view.reset_filters();
        assert_eq!(view.criteria(), &FilterCriteria::default());
        assert_eq!(view.tab(), StatusFilter::All);
        assert!(view.column_filters().is_empty());

        let rows = vec![payment(
            "PAY-1",
            "Alice Bernard",
            100,
            PaymentMethodKind::Stripe,
            PaymentStatus::Pending,
            day(2024, 1, 1),
        )];
        assert_eq!(view.compute(&rows).page.total, 1);
    }
}
