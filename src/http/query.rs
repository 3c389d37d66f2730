//! Table query string parsing.
//!
//! Table endpoints accept the filter controls as query parameters:
//!
//! | parameter | meaning |
//! |-----------|---------|
//! | `search` | name filter |
//! | `status` | status filter code, or `all` |
//! | `start_date`, `end_date` | primary date filter (`YYYY-MM-DD`) |
//! | `min_amount`, `max_amount` | amount range, in currency units (`12,50`) |
//! | `relations` | comma-separated subscription titles |
//! | `tab` | status tab code, or `all` |
//! | `from`, `to` | date-range stage window |
//! | `col.<column>` | column filter |
//! | `sort`, `order` | sort column and `asc`/`desc` |
//! | `page`, `per_page` | 1-based page number and page size |
//!
//! Blank values are treated as absent. Anything unparsable is rejected.

use axum::extract::Query as AxumQuery;
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::TableConfig;
use crate::error::{DeskError, Result};
use crate::records::money::parse_amount;
use crate::table::{
    ColumnFilters, FilterCriteria, SortDirection, SortSpec, StatusFilter, TableSchema, TableView,
};

/// Raw query pairs, in request order. Repeated keys are kept.
pub type RawQuery = AxumQuery<Vec<(String, String)>>;

const COLUMN_PREFIX: &str = "col.";

/// Parsed table query, independent of the entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub tab: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub relations: Vec<String>,
    pub sort: Option<String>,
    pub order: Option<SortDirection>,
    /// 1-based.
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub columns: ColumnFilters,
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DeskError::bad_request(format!("{}: date invalide '{}'", key, value)))
}

fn parse_money(key: &str, value: &str) -> Result<i64> {
    parse_amount(value)
        .ok_or_else(|| DeskError::bad_request(format!("{}: montant invalide '{}'", key, value)))
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| DeskError::bad_request(format!("{}: entier attendu, reçu '{}'", key, value)))
}

impl TableQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();

            if let Some(column) = key.strip_prefix(COLUMN_PREFIX) {
                query.columns.set(column, value);
                continue;
            }
            if value.is_empty() {
                continue;
            }
            match key {
                "search" => query.search = Some(value.to_string()),
                "status" => query.status = Some(value.to_string()),
                "tab" => query.tab = Some(value.to_string()),
                "start_date" => query.start_date = Some(parse_date(key, value)?),
                "end_date" => query.end_date = Some(parse_date(key, value)?),
                "from" => query.from = Some(parse_date(key, value)?),
                "to" => query.to = Some(parse_date(key, value)?),
                "min_amount" => query.min_amount = Some(parse_money(key, value)?),
                "max_amount" => query.max_amount = Some(parse_money(key, value)?),
                "relations" => query.relations.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                ),
                "sort" => query.sort = Some(value.to_string()),
                "order" => {
                    query.order = Some(SortDirection::parse(value).ok_or_else(|| {
                        DeskError::bad_request(format!("order: 'asc' ou 'desc' attendu, reçu '{}'", value))
                    })?)
                }
                "page" => query.page = Some(parse_count(key, value)?),
                "per_page" => query.per_page = Some(parse_count(key, value)?),
                _ => {
                    tracing::debug!(target: "ledgerdesk::http", key, "ignoring unknown query parameter");
                }
            }
        }
        Ok(query)
    }

    fn status_filter<S: TableSchema>(
        key: &str,
        value: Option<&str>,
    ) -> Result<StatusFilter<S::Status>> {
        match value {
            None => Ok(StatusFilter::All),
            Some(code) => StatusFilter::parse(code)
                .ok_or_else(|| DeskError::bad_request(format!("{}: statut inconnu '{}'", key, code))),
        }
    }

    /// Build a view for `schema` with this query applied.
    pub fn into_view<S: TableSchema>(self, schema: S, table: &TableConfig) -> Result<TableView<S>> {
        let rows_per_page = self.per_page.unwrap_or(table.default_rows_per_page);
        if rows_per_page == 0 || rows_per_page > table.max_rows_per_page {
            return Err(DeskError::bad_request(format!(
                "per_page doit être compris entre 1 et {}",
                table.max_rows_per_page
            )));
        }
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(DeskError::bad_request("page commence à 1"));
        }

        let status = Self::status_filter::<S>("status", self.status.as_deref())?;
        let tab = Self::status_filter::<S>("tab", self.tab.as_deref())?;

        let sort = match (self.sort, self.order) {
            (Some(column), order) => {
                if schema.column(&column).is_none() {
                    return Err(DeskError::bad_request(format!(
                        "sort: colonne inconnue '{}'",
                        column
                    )));
                }
                Some(SortSpec {
                    column,
                    direction: order.unwrap_or_default(),
                })
            }
            (None, Some(direction)) => Some(SortSpec {
                direction,
                ..schema.default_sort()
            }),
            (None, None) => None,
        };

        let criteria = FilterCriteria {
            name: self.search,
            status,
            start_date: self.start_date,
            end_date: self.end_date,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            relations: self.relations,
        };

        let mut view = TableView::new(schema, rows_per_page);
        view.set_criteria(criteria);
        view.set_tab(tab);
        view.set_column_filters(self.columns);
        view.set_date_window(self.from, self.to);
        if let Some(sort) = sort {
            view.set_sort(sort);
        }
        view.set_page(page - 1);
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InvoiceStatus;
    use crate::table::InvoiceTable;

    fn pairs(items: &[(&str, &str)]) -> Result<TableQuery> {
        TableQuery::from_pairs(items.iter().copied())
    }

    #[test]
    fn test_parses_every_parameter() {
        let query = pairs(&[
            ("search", " alice "),
            ("status", "paid"),
            ("start_date", "2024-01-01"),
            ("end_date", "2024-03-31"),
            ("min_amount", "10,50"),
            ("max_amount", "200"),
            ("relations", "Pro, Support,,"),
            ("relations", "Starter"),
            ("col.number", "FAC"),
            ("sort", "amount"),
            ("order", "DESC"),
            ("page", "2"),
            ("per_page", "25"),
        ])
        .unwrap();

        assert_eq!(query.search.as_deref(), Some("alice"));
        assert_eq!(query.min_amount, Some(1_050));
        assert_eq!(query.max_amount, Some(20_000));
        assert_eq!(query.relations, vec!["Pro", "Support", "Starter"]);
        assert_eq!(query.columns.get("number"), Some("FAC"));
        assert_eq!(query.order, Some(SortDirection::Desc));
        assert_eq!(query.page, Some(2));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let query = pairs(&[("search", "  "), ("start_date", ""), ("col.number", " ")]).unwrap();
        assert_eq!(query, TableQuery::default());
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(pairs(&[("start_date", "05/01/2024")]).is_err());
        assert!(pairs(&[("min_amount", "abc")]).is_err());
        assert!(pairs(&[("order", "up")]).is_err());
        assert!(pairs(&[("page", "-1")]).is_err());
    }

    #[test]
    fn test_into_view_applies_state() {
        let query = pairs(&[
            ("status", "paid"),
            ("tab", "overdue"),
            ("sort", "amount"),
            ("page", "3"),
            ("per_page", "5"),
        ])
        .unwrap();
        let view = query
            .into_view(InvoiceTable::new(), &TableConfig::default())
            .unwrap();

        assert_eq!(view.criteria().status, StatusFilter::Only(InvoiceStatus::Paid));
        assert_eq!(view.tab(), StatusFilter::Only(InvoiceStatus::Overdue));
        assert_eq!(view.sort(), &SortSpec::asc("amount"));
        assert_eq!(view.window().page, 2);
        assert_eq!(view.window().rows_per_page, 5);
    }

    #[test]
    fn test_order_alone_flips_default_sort() {
        let view = pairs(&[("order", "asc")])
            .unwrap()
            .into_view(InvoiceTable::new(), &TableConfig::default())
            .unwrap();
        assert_eq!(view.sort(), &SortSpec::asc("issue_date"));
    }

    #[test]
    fn test_into_view_rejects_out_of_range() {
        let config = TableConfig::default();
        let bad = |items: &[(&str, &str)]| {
            pairs(items)
                .unwrap()
                .into_view(InvoiceTable::new(), &config)
                .is_err()
        };
        assert!(bad(&[("per_page", "0")]));
        assert!(bad(&[("per_page", "1000")]));
        assert!(bad(&[("page", "0")]));
        assert!(bad(&[("status", "unknown")]));
        assert!(bad(&[("sort", "nope")]));
    }
}
