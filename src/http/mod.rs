//! HTTP surface: response wrappers, table query parsing and the route modules.

pub mod payment_config;
pub mod query;
pub mod response;
pub mod routes;
pub mod support;
pub mod tables;

pub use payment_config::PaymentConfigModule;
pub use query::{RawQuery, TableQuery};
pub use response::{ApiResponse, CsvResponse, JsonResponse, PaginationMeta, TablePage};
pub use routes::RouteModule;
pub use support::SupportModule;
pub use tables::{ColumnInfo, TableEntity, TablesModule};
