use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::insights::repo::{self, InsightFilters, InsightQuery, NewInsight};
use crate::listing::OffsetPage;
use crate::models::insight::Insight;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsightListResponse {
    pub success: bool,
    pub data: Vec<Insight>,
    pub pagination: OffsetPage,
    pub filters: InsightFilters,
}

/// GET /api/insights
pub async fn handle_list_insights(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InsightQuery>,
) -> Json<InsightListResponse> {
    let (data, pagination, filters) = repo::list(&state.store, &query);
    Json(InsightListResponse {
        success: true,
        data,
        pagination,
        filters,
    })
}

/// POST /api/insights
pub async fn handle_create_insight(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewInsight>,
) -> Result<(StatusCode, Json<Envelope<Insight>>), AppError> {
    let insight = repo::create(&state.store, input)?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            insight,
            "AI insight created successfully",
        )),
    ))
}
