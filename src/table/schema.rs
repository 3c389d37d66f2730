//! Per-entity table configuration consumed by the filter pipeline.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::labels::LabelTable;
use crate::records::{LabeledEnum, Record, french_date, iso_date, money::format_amount};

/// How a column's values are matched by column filters.
#[derive(Debug, Clone)]
pub enum ColumnKind {
    /// Free text, case-insensitive substring match.
    Text,
    /// Amount in cents, matched against its decimal rendering.
    Amount,
    /// Day, matched against its ISO and French renderings.
    Date,
    /// Yes/no column, filtered with `oui` / `non`.
    Boolean,
    /// Enumerated value with display labels.
    Label(LabelTable),
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Amount => "amount",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Label(_) => "label",
        }
    }
}

/// A single cell value extracted from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(String),
    Amount(i64),
    Date(NaiveDate),
    Bool(bool),
    Code(&'static str),
}

impl ColumnValue {
    /// Total order used for sorting. Values of different kinds compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Amount(a), Self::Amount(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Code(a), Self::Code(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    /// Plain-text rendering, using `labels` for coded values when given.
    pub fn render(&self, labels: Option<&LabelTable>) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Amount(cents) => format_amount(*cents),
            Self::Date(date) => iso_date(*date),
            Self::Bool(true) => "oui".to_string(),
            Self::Bool(false) => "non".to_string(),
            Self::Code(code) => labels
                .and_then(|l| l.label(code))
                .unwrap_or(*code)
                .to_string(),
        }
    }

    /// Every textual form a user might search for.
    pub(crate) fn search_forms(&self, labels: Option<&LabelTable>) -> Vec<String> {
        match self {
            Self::Date(date) => vec![iso_date(*date), french_date(*date)],
            Self::Amount(cents) => {
                let plain = format_amount(*cents);
                let comma = plain.replace('.', ",");
                vec![plain, comma]
            }
            Self::Code(code) => {
                let mut forms = vec![code.to_string()];
                if let Some(label) = labels.and_then(|l| l.label(code)) {
                    forms.push(label.to_string());
                }
                forms
            }
            other => vec![other.render(labels)],
        }
    }
}

/// Column definition: identifier, header, match policy and value accessor.
pub struct ColumnDef<R> {
    pub id: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub value: fn(&R) -> ColumnValue,
}

impl<R> ColumnDef<R> {
    pub fn new(
        id: &'static str,
        header: &'static str,
        kind: ColumnKind,
        value: fn(&R) -> ColumnValue,
    ) -> Self {
        Self {
            id,
            header,
            kind,
            sortable: true,
            value,
        }
    }

    #[must_use]
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Label table for `Label` columns.
    pub fn labels(&self) -> Option<&LabelTable> {
        match &self.kind {
            ColumnKind::Label(table) => Some(table),
            _ => None,
        }
    }

    /// Rendered cell text for a row.
    pub fn render(&self, row: &R) -> String {
        (self.value)(row).render(self.labels())
    }
}

impl<R> fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("kind", &self.kind)
            .field("sortable", &self.sortable)
            .finish()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Orient an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// The sortable column and direction currently applied to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Field accessors for one entity type.
///
/// One implementation per table drives the shared filter, column-filter,
/// date-range and tab stages.
pub trait TableSchema: Send + Sync + 'static {
    type Row: Record;
    type Status: LabeledEnum;

    /// Fields searched by the name filter. A row matches if any field does.
    fn search_fields<'r>(&self, row: &'r Self::Row) -> Vec<&'r str>;

    fn status(&self, row: &Self::Row) -> Self::Status;

    /// Amount used by the amount-range filter, in cents.
    fn amount(&self, row: &Self::Row) -> i64;

    /// Date used by date-range filtering.
    fn date(&self, row: &Self::Row) -> NaiveDate;

    /// Titles of related subscriptions, matched by the relation filter.
    fn relation_titles<'r>(&self, row: &'r Self::Row) -> Vec<&'r str>;

    fn columns(&self) -> &[ColumnDef<Self::Row>];

    fn default_sort(&self) -> SortSpec;

    fn column(&self, id: &str) -> Option<&ColumnDef<Self::Row>> {
        self.columns().iter().find(|c| c.id == id)
    }

    /// Compare two rows for `sort`. Unknown columns compare equal.
    fn compare(&self, sort: &SortSpec, a: &Self::Row, b: &Self::Row) -> Ordering {
        match self.column(&sort.column) {
            Some(column) => sort
                .direction
                .apply((column.value)(a).compare(&(column.value)(b))),
            None => Ordering::Equal,
        }
    }
}
