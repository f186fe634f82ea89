//! Axum route handlers for the Deals API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::deals::repo::{self, DealFilters, DealPatch, DealQuery, NewDeal};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::deal::Deal;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DealListResponse {
    pub success: bool,
    pub data: Vec<Deal>,
    pub total: usize,
    pub filters: DealFilters,
}

/// GET /api/deals
pub async fn handle_list_deals(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DealQuery>,
) -> Json<DealListResponse> {
    let (data, filters) = repo::list(&state.store, &query);
    Json(DealListResponse {
        success: true,
        total: data.len(),
        data,
        filters,
    })
}

/// POST /api/deals
pub async fn handle_create_deal(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewDeal>,
) -> Result<(StatusCode, Json<Envelope<Deal>>), AppError> {
    let deal = repo::create(&state.store, input)?;
    tracing::info!("Created deal {} ({})", deal.id, deal.name);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(deal, "Deal created successfully")),
    ))
}

/// GET /api/deals/:id
pub async fn handle_get_deal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Deal>>, AppError> {
    Ok(Json(Envelope::ok(repo::get(&state.store, &id)?)))
}

/// PUT /api/deals/:id
pub async fn handle_update_deal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<DealPatch>,
) -> Result<Json<Envelope<Deal>>, AppError> {
    let deal = repo::update(&state.store, &id, patch)?;
    Ok(Json(Envelope::with_message(deal, "Deal updated successfully")))
}

/// DELETE /api/deals/:id
pub async fn handle_delete_deal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Deal>>, AppError> {
    let deal = repo::delete(&state.store, &id)?;
    tracing::info!("Deleted deal {id}");
    Ok(Json(Envelope::with_message(deal, "Deal deleted successfully")))
}
