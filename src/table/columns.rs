//! Per-column free-text filters layered over the primary filter output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::{ColumnDef, ColumnKind, ColumnValue, TableSchema};

/// Column id → typed filter text, in the order the filters were set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnFilters(IndexMap<String, String>);

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter for a column. A blank value removes it.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.0.shift_remove(&column);
        } else {
            self.0.insert(column, value);
        }
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (column, value) in iter {
            filters.set(column, value);
        }
        filters
    }
}

/// A filter value resolved against its column once per call.
enum Matcher<'s, R> {
    /// Compare the stored code with a resolved option.
    Code {
        column: &'s ColumnDef<R>,
        code: &'static str,
    },
    /// Substring over every searchable rendering of the value.
    Substring {
        column: &'s ColumnDef<R>,
        needle: String,
    },
    Bool {
        column: &'s ColumnDef<R>,
        wanted: bool,
    },
}

impl<R> Matcher<'_, R> {
    fn matches(&self, row: &R) -> bool {
        match self {
            Self::Code { column, code } => {
                matches!((column.value)(row), ColumnValue::Code(stored) if stored == *code)
            }
            Self::Substring { column, needle } => (column.value)(row)
                .search_forms(column.labels())
                .iter()
                .any(|form| form.to_lowercase().contains(needle.as_str())),
            Self::Bool { column, wanted } => {
                matches!((column.value)(row), ColumnValue::Bool(value) if value == *wanted)
            }
        }
    }
}

fn parse_oui_non(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "oui" => Some(true),
        "non" => Some(false),
        _ => None,
    }
}

fn matcher_for<'s, R>(column: &'s ColumnDef<R>, value: &str) -> Option<Matcher<'s, R>> {
    let needle = value.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    match &column.kind {
        ColumnKind::Label(labels) => Some(match labels.resolve(value) {
            Some(code) => Matcher::Code { column, code },
            None => Matcher::Substring { column, needle },
        }),
        // Anything other than oui/non leaves the column unfiltered.
        ColumnKind::Boolean => parse_oui_non(value).map(|wanted| Matcher::Bool { column, wanted }),
        ColumnKind::Text | ColumnKind::Amount | ColumnKind::Date => {
            Some(Matcher::Substring { column, needle })
        }
    }
}

/// Keep rows matching every non-empty column filter.
pub fn apply_column_filters<S: TableSchema>(
    schema: &S,
    rows: Vec<S::Row>,
    filters: &ColumnFilters,
) -> Vec<S::Row> {
    if filters.is_empty() {
        return rows;
    }

    let matchers: Vec<Matcher<'_, S::Row>> = filters
        .iter()
        .filter_map(|(id, value)| match schema.column(id) {
            Some(column) => matcher_for(column, value),
            None => {
                tracing::debug!(
                    target: "ledgerdesk::table",
                    column = id,
                    "ignoring filter on unknown column"
                );
                None
            }
        })
        .collect();

    if matchers.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| matchers.iter().all(|m| m.matches(row)))
        .collect()
}
