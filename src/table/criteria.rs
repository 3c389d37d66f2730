//! Filter criteria bound to the table filter controls.

use chrono::NaiveDate;
use serde::Serialize;

use crate::records::LabeledEnum;

/// Status selection: every status, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusFilter<S> {
    All,
    Only(S),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        Self::All
    }
}

impl<S: LabeledEnum> StatusFilter<S> {
    pub fn matches(&self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }

    /// Parse `all` (or blank) and status codes.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        S::from_code(value).map(Self::Only)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.code(),
        }
    }
}

/// Structured filter object.
///
/// `None`, blank strings and empty lists are inactive; they never exclude rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria<S> {
    /// Case-insensitive substring matched against the schema's search fields.
    pub name: Option<String>,
    pub status: StatusFilter<S>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Inclusive lower bound, in cents.
    pub min_amount: Option<i64>,
    /// Inclusive upper bound, in cents.
    pub max_amount: Option<i64>,
    /// Selected subscription titles.
    pub relations: Vec<String>,
}

impl<S> Default for FilterCriteria<S> {
    fn default() -> Self {
        Self {
            name: None,
            status: StatusFilter::All,
            start_date: None,
            end_date: None,
            min_amount: None,
            max_amount: None,
            relations: Vec::new(),
        }
    }
}

impl<S> FilterCriteria<S> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: S) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    #[must_use]
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_amount_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    #[must_use]
    pub fn with_relations<I, T>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.relations = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Start date after end date. The date filter is skipped while true.
    pub fn date_error(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(start), Some(end)) if start > end)
    }

    /// Minimum above maximum. The amount filter is skipped while true.
    pub fn amount_error(&self) -> bool {
        matches!((self.min_amount, self.max_amount), (Some(min), Some(max)) if min > max)
    }

    /// Lowercased name query, if active.
    pub(crate) fn name_query(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
    }

    /// Selected relation titles with blanks dropped.
    pub(crate) fn active_relations(&self) -> Vec<&str> {
        self.relations
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Inclusive day window used by the date-range stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Inclusive containment by day.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}
