//! Support board endpoints under `/api/support`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use super::response::{ApiResponse, JsonResponse};
use super::routes::RouteModule;
use crate::app::AppState;
use crate::records::{Ticket, TicketPatch, TicketStatus};
use crate::repository::edit_record;
use crate::support::{KanbanBoard, TicketDetail};

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTicket {
    pub status: TicketStatus,
}

async fn board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> JsonResponse<KanbanBoard> {
    let board = state.support.board(query.search.as_deref()).await?;
    Ok(ApiResponse::success(board))
}

async fn ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> JsonResponse<TicketDetail> {
    Ok(ApiResponse::success(state.support.ticket_detail(id).await?))
}

async fn edit_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TicketPatch>,
) -> JsonResponse<Ticket> {
    let ticket = edit_record(state.tickets.as_ref(), state.audit.as_ref(), id, patch).await?;
    Ok(ApiResponse::success(ticket))
}

async fn move_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveTicket>,
) -> JsonResponse<Ticket> {
    let ticket = state.support.move_ticket(id, body.status).await?;
    Ok(ApiResponse::success(ticket))
}

pub struct SupportModule;

impl RouteModule for SupportModule {
    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route("/board", get(board))
            .route("/tickets/{id}", get(ticket).patch(edit_ticket))
            .route("/tickets/{id}/move", post(move_ticket))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/support")
    }
}
