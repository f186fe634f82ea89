//! Axum route handlers for the Clients API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::clients::repo::{self, ClientFilters, ClientPatch, ClientQuery, NewClient};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::listing::OffsetPage;
use crate::models::client::Client;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub success: bool,
    pub data: Vec<Client>,
    pub pagination: OffsetPage,
    pub filters: ClientFilters,
}

/// GET /api/clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClientQuery>,
) -> Json<ClientListResponse> {
    let page = repo::list(&state.store, &query);
    Json(ClientListResponse {
        success: true,
        data: page.clients,
        pagination: page.pagination,
        filters: page.filters,
    })
}

/// POST /api/clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewClient>,
) -> Result<(StatusCode, Json<Envelope<Client>>), AppError> {
    let client = repo::create(&state.store, input)?;
    tracing::info!("Created client {} (score {})", client.id, client.score);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(client, "Client created successfully")),
    ))
}

/// GET /api/clients/:id
pub async fn handle_get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Client>>, AppError> {
    Ok(Json(Envelope::ok(repo::get(&state.store, &id)?)))
}

/// PUT /api/clients/:id
pub async fn handle_update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ClientPatch>,
) -> Result<Json<Envelope<Client>>, AppError> {
    let client = repo::update(&state.store, &id, patch)?;
    Ok(Json(Envelope::with_message(
        client,
        "Client updated successfully",
    )))
}

/// DELETE /api/clients/:id
pub async fn handle_delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Client>>, AppError> {
    let client = repo::delete(&state.store, &id)?;
    Ok(Json(Envelope::with_message(
        client,
        "Client deleted successfully",
    )))
}
