//! Filter, sort and paginate pipeline shared by the back-office tables.
//!
//! Each entity implements [`TableSchema`] once; the stages below are generic
//! over it:
//!
//! 1. [`apply_filter`]: stable sort plus the [`FilterCriteria`] filters
//! 2. [`apply_status_tab`]: the selected status tab
//! 3. [`apply_column_filters`]: per-column text filters
//! 4. [`apply_date_range`]: the date-range window
//! 5. [`paginate`]: the requested page
//!
//! [`TableView`] holds the state for one table and runs all of them.
//!
//! # Example
//!
//! ```rust
//! use ledgerdesk::records::InvoiceStatus;
//! use ledgerdesk::table::{FilterCriteria, InvoiceTable, TableView};
//!
//! let mut view = TableView::new(InvoiceTable::new(), 10);
//! view.set_criteria(FilterCriteria::new().with_status(InvoiceStatus::Paid));
//! let snapshot = view.compute(&[]);
//! assert_eq!(snapshot.page.total, 0);
//! ```

pub mod columns;
pub mod criteria;
pub mod date_range;
pub mod entities;
pub mod filter;
pub mod labels;
pub mod pager;
pub mod schema;
pub mod tabs;
pub mod view;

pub use columns::{ColumnFilters, apply_column_filters};
pub use criteria::{DateWindow, FilterCriteria, StatusFilter};
pub use date_range::apply_date_range;
pub use entities::{InvoiceTable, PaymentTable, SubscriberTable};
pub use filter::{apply_filter, comparator, stable_sort};
pub use labels::LabelTable;
pub use pager::{Page, PageWindow, paginate};
pub use schema::{ColumnDef, ColumnKind, ColumnValue, SortDirection, SortSpec, TableSchema};
pub use tabs::{TabSummary, apply_status_tab, percentage, status_counts, tab_summaries};
pub use view::{TableSnapshot, TableView};
