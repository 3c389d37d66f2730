//! Invoice, payment and subscriber table endpoints.
//!
//! Every entity gets the same routes under `/api/<entity>`:
//!
//! - `GET /` one page of the filtered table, with tab badges
//! - `GET /export` the whole filtered table as CSV
//! - `GET /columns` column metadata for the filter controls
//! - `GET /{id}` and `PATCH /{id}` a single record and inline edits

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::query::{RawQuery, TableQuery};
use super::response::{ApiResponse, CsvResponse, JsonResponse, TablePage};
use super::routes::RouteModule;
use crate::app::AppState;
use crate::error::{DeskError, Result};
use crate::export::CsvExport;
use crate::records::{
    Invoice, InvoicePatch, Patch, Payment, PaymentPatch, Record, Subscriber, SubscriberPatch,
};
use crate::repository::{RecordRepository, edit_record, sync_subscriber_refs};
use crate::table::{InvoiceTable, PaymentTable, SubscriberTable, TableSchema, TableView};

/// A record type served as a table.
pub trait TableEntity: CsvExport + Serialize {
    type Schema: TableSchema<Row = Self> + Default;
    type Edit: Patch<Self> + Serialize + DeserializeOwned + Send + 'static;

    fn repository(state: &AppState) -> &Arc<dyn RecordRepository<Self>>;

    /// Runs after a successful inline edit of `row`.
    fn after_edit<'a>(
        _state: &'a AppState,
        _row: &'a Self,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

impl TableEntity for Invoice {
    type Schema = InvoiceTable;
    type Edit = InvoicePatch;

    fn repository(state: &AppState) -> &Arc<dyn RecordRepository<Self>> {
        &state.invoices
    }
}

impl TableEntity for Payment {
    type Schema = PaymentTable;
    type Edit = PaymentPatch;

    fn repository(state: &AppState) -> &Arc<dyn RecordRepository<Self>> {
        &state.payments
    }
}

impl TableEntity for Subscriber {
    type Schema = SubscriberTable;
    type Edit = SubscriberPatch;

    fn repository(state: &AppState) -> &Arc<dyn RecordRepository<Self>> {
        &state.subscribers
    }

    fn after_edit<'a>(
        state: &'a AppState,
        row: &'a Self,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            sync_subscriber_refs(state.invoices.as_ref(), state.payments.as_ref(), row).await?;
            Ok(())
        })
    }
}

/// Column metadata for building filter controls.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub id: &'static str,
    pub header: &'static str,
    pub kind: &'static str,
    pub sortable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ColumnOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnOption {
    pub code: &'static str,
    pub label: &'static str,
}

fn view_for<E: TableEntity>(
    state: &AppState,
    pairs: Vec<(String, String)>,
) -> Result<TableView<E::Schema>> {
    TableQuery::from_pairs(pairs)?.into_view(E::Schema::default(), &state.table)
}

async fn list_rows<E: TableEntity>(
    State(state): State<AppState>,
    Query(pairs): RawQuery,
) -> JsonResponse<TablePage<E>> {
    let view = view_for::<E>(&state, pairs)?;
    let rows = E::repository(&state).list().await?;
    Ok(ApiResponse::success(TablePage::from(view.compute(&rows))))
}

async fn export_rows<E: TableEntity>(
    State(state): State<AppState>,
    Query(pairs): RawQuery,
) -> Result<CsvResponse> {
    let view = view_for::<E>(&state, pairs)?;
    let rows = E::repository(&state).list().await?;
    let filtered = view.filtered(&rows);
    let file = state.exporter.export(&filtered, Utc::now()).await?;
    Ok(CsvResponse(file))
}

async fn columns<E: TableEntity>() -> ApiResponse<Vec<ColumnInfo>> {
    let schema = E::Schema::default();
    let columns = schema
        .columns()
        .iter()
        .map(|column| ColumnInfo {
            id: column.id,
            header: column.header,
            kind: column.kind.name(),
            sortable: column.sortable,
            options: column
                .labels()
                .map(|labels| {
                    labels
                        .options()
                        .map(|(code, label)| ColumnOption { code, label })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();
    ApiResponse::success(columns)
}

async fn get_row<E: TableEntity>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> JsonResponse<E> {
    let row = E::repository(&state)
        .get(id)
        .await?
        .ok_or_else(|| DeskError::not_found(format!("{} {}", E::ENTITY, id)))?;
    Ok(ApiResponse::success(row))
}

async fn edit_row<E: TableEntity>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<E::Edit>,
) -> JsonResponse<E> {
    let row = edit_record(E::repository(&state).as_ref(), state.audit.as_ref(), id, patch).await?;
    E::after_edit(&state, &row).await?;
    Ok(ApiResponse::success_with_message(row, "Modifications enregistrées"))
}

fn entity_routes<E: TableEntity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rows::<E>))
        .route("/export", get(export_rows::<E>))
        .route("/columns", get(columns::<E>))
        .route("/{id}", get(get_row::<E>).patch(edit_row::<E>))
}

/// Table routes for invoices, payments and subscribers.
pub struct TablesModule;

impl RouteModule for TablesModule {
    fn routes(&self) -> Router<AppState> {
        Router::new()
            .nest(&format!("/{}", Invoice::ENTITY), entity_routes::<Invoice>())
            .nest(&format!("/{}", Payment::ENTITY), entity_routes::<Payment>())
            .nest(&format!("/{}", Subscriber::ENTITY), entity_routes::<Subscriber>())
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api")
    }
}
