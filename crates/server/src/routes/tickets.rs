use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use models::Ticket;
use service::tickets::{self, TicketInput};

use crate::errors::ApiError;
use crate::session::SessionContext;
use crate::state::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Ticket to prefill the edit form with
    pub edit_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flash {
    Created,
    Updated,
    Deleted,
}

/// The ticket manager page: the whole list, plus whatever the request touched.
#[derive(Debug, Serialize)]
pub struct TicketsPage {
    pub tickets: Vec<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[utoipa::path(get, path = "/app/tickets", tag = "app", params(ListQuery), responses((status = 200, description = "Ticket list", body = crate::openapi::TicketsPageDoc), (status = 303, description = "Not signed in; redirect to /login")))]
pub async fn list(
    State(state): State<ServerState>,
    session: SessionContext,
    Query(q): Query<ListQuery>,
) -> Result<Json<TicketsPage>, ApiError> {
    let store = state.users.open().await?;
    let user = session.user(&store)?;
    // an unknown edit_id just leaves the form empty
    let edit_ticket = q
        .edit_id
        .as_deref()
        .and_then(|id| tickets::find_ticket(&store, &session.email, id).ok())
        .cloned();
    Ok(Json(TicketsPage { tickets: user.tickets.clone(), edit_ticket, ticket: None, flash: None }))
}

#[utoipa::path(post, path = "/app/tickets", tag = "app", request_body = crate::openapi::TicketRequest, responses((status = 201, description = "Created", body = crate::openapi::TicketsPageDoc), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<ServerState>,
    session: SessionContext,
    Json(input): Json<TicketInput>,
) -> Result<(StatusCode, Json<TicketsPage>), ApiError> {
    let mut store = state.users.open_for_write().await?;
    session.user(&store)?;
    let created = tickets::create_ticket(&mut store, &session.email, input, today()).await?;
    let all = tickets::list_tickets(&store, &session.email)?.to_vec();
    Ok((
        StatusCode::CREATED,
        Json(TicketsPage { tickets: all, edit_ticket: None, ticket: Some(created), flash: Some(Flash::Created) }),
    ))
}

#[utoipa::path(put, path = "/app/tickets/{id}", tag = "app", params(("id" = String, Path, description = "Ticket id, e.g. t3")), request_body = crate::openapi::TicketRequest, responses((status = 200, description = "Updated", body = crate::openapi::TicketsPageDoc), (status = 404, description = "No such ticket")))]
pub async fn update(
    State(state): State<ServerState>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(input): Json<TicketInput>,
) -> Result<Json<TicketsPage>, ApiError> {
    let mut store = state.users.open_for_write().await?;
    session.user(&store)?;
    let updated = tickets::update_ticket(&mut store, &session.email, &id, input, today()).await?;
    let all = tickets::list_tickets(&store, &session.email)?.to_vec();
    Ok(Json(TicketsPage { tickets: all, edit_ticket: None, ticket: Some(updated), flash: Some(Flash::Updated) }))
}

#[utoipa::path(delete, path = "/app/tickets/{id}", tag = "app", params(("id" = String, Path, description = "Ticket id, e.g. t3")), responses((status = 200, description = "Deleted", body = crate::openapi::TicketsPageDoc), (status = 404, description = "No such ticket")))]
pub async fn delete(
    State(state): State<ServerState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Result<Json<TicketsPage>, ApiError> {
    let mut store = state.users.open_for_write().await?;
    session.user(&store)?;
    let removed = tickets::delete_ticket(&mut store, &session.email, &id).await?;
    let all = tickets::list_tickets(&store, &session.email)?.to_vec();
    Ok(Json(TicketsPage { tickets: all, edit_ticket: None, ticket: Some(removed), flash: Some(Flash::Deleted) }))
}
