use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::extract::ApiQuery;
use crate::search::relevance::{self, Scope, DEFAULT_LIMIT};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub scope: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let query = relevance::normalise_query(params.q.as_deref())?;
    let scope = Scope::parse(params.scope.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let results = relevance::search(&state.store, &query, scope, limit);
    let total = results.total();
    tracing::debug!("Search '{query}' in {} returned {total} hits", scope.as_str());

    let data = match scope {
        Scope::Deals => json!(results.deals),
        Scope::Clients => json!(results.clients),
        Scope::Insights => json!(results.insights),
        Scope::All => {
            let breakdown = json!({
                "deals": results.deals.len(),
                "clients": results.clients.len(),
                "insights": results.insights.len(),
            });
            json!({
                "results": results.ranked(limit.saturating_mul(2)),
                "breakdown": breakdown,
            })
        }
    };

    Ok(Json(json!({
        "success": true,
        "data": data,
        "total": total,
        "query": query,
        "type": scope.as_str(),
    })))
}
