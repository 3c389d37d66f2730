use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::export::CsvFile;
use crate::table::{TabSummary, TableSnapshot};

/// Standard JSON response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// One page of a table with its tab badges.
#[derive(Debug, Serialize)]
pub struct TablePage<R: Serialize> {
    pub items: Vec<R>,
    pub pagination: PaginationMeta,
    pub tabs: Vec<TabSummary>,
    /// Start date after end date; the date filter was not applied.
    pub date_error: bool,
    /// Minimum above maximum; the amount filter was not applied.
    pub amount_error: bool,
}

/// Pagination metadata. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<R: Serialize> From<TableSnapshot<R>> for TablePage<R> {
    fn from(snapshot: TableSnapshot<R>) -> Self {
        let page = snapshot.page;
        let pagination = PaginationMeta {
            total: page.total,
            page: page.page + 1,
            per_page: page.rows_per_page,
            total_pages: page.total_pages,
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        };
        Self {
            items: page.items,
            pagination,
            tabs: snapshot.tabs,
            date_error: snapshot.date_error,
            amount_error: snapshot.amount_error,
        }
    }
}

/// CSV download.
#[derive(Debug)]
pub struct CsvResponse(pub CsvFile);

impl IntoResponse for CsvResponse {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.0.filename);
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.0.content,
        )
            .into_response()
    }
}

/// Convenience type alias for JSON handlers
pub type JsonResponse<T> = Result<ApiResponse<T>, crate::error::DeskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Page, TableSnapshot};

    #[test]
    fn test_table_page_is_one_based() {
        let snapshot = TableSnapshot {
            page: Page {
                items: vec![1, 2],
                total: 12,
                page: 0,
                rows_per_page: 2,
                total_pages: 6,
            },
            tabs: Vec::new(),
            date_error: false,
            amount_error: true,
        };
        let page = TablePage::from(snapshot);
        assert_eq!(page.pagination.page, 1);
        assert!(page.pagination.has_next);
        assert!(!page.pagination.has_prev);
        assert!(page.amount_error);
    }

    #[test]
    fn test_csv_response_headers() {
        let response = CsvResponse(CsvFile {
            filename: "invoices_export_20240105_093000.csv".to_string(),
            content: "a,b\r\n".to_string(),
        })
        .into_response();

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"invoices_export_20240105_093000.csv\""
        );
    }
}
