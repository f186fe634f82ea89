use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::stats::{self, DashboardStats};
use crate::extract::ApiQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsMetadata {
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub data_source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: DashboardStats,
    pub metadata: StatsMetadata,
}

/// GET /api/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Json<StatsResponse> {
    let period = query.period.unwrap_or_else(|| "30d".to_string());
    let data = stats::compute(&state.store, &period);
    Json(StatsResponse {
        success: true,
        data,
        metadata: StatsMetadata {
            period,
            generated_at: Utc::now(),
            data_source: "in_memory_store",
        },
    })
}
