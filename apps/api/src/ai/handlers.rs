//! Axum route handlers for the AI advisory endpoints.
//!
//! Each endpoint answers 200 whether the model was reachable or not; only a
//! missing required input is an error.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::ai::blockchain::{self, BlockchainRequest};
use crate::ai::chat::{self, ChatRequest};
use crate::ai::collaboration::{self, CollaborationRequest};
use crate::ai::documents::{self, AnalyzeRequest};
use crate::ai::market::{self, MarketRequest};
use crate::ai::negotiation::{self, NegotiationRequest};
use crate::ai::prediction::{self, PredictRequest};
use crate::ai::reports::{self, ReportRequest};
use crate::ai::risk::{self, RiskRequest};
use crate::ai::visualization::{self, VisualizationRequest};
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

fn required_object<'a>(value: Option<&'a Value>, message: &str) -> Result<&'a Value, AppError> {
    value
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// POST /api/ai/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let message = required(request.message.as_deref(), "Message is required")?;
    let mut body = chat::respond(state.llm.as_ref(), message, &request).await;
    if let Some(map) = body.as_object_mut() {
        map.insert("success".to_string(), Value::Bool(true));
    }
    Ok(Json(body))
}

/// POST /api/ai/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> Result<Json<Value>, AppError> {
    let content = required(request.content.as_deref(), "Document content is required")?;
    let analysis = documents::analyze(state.llm.as_ref(), content, &request).await;
    Ok(Json(json!({"success": true, "analysis": analysis})))
}

/// POST /api/ai/predict
pub async fn handle_predict(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PredictRequest>,
) -> Result<Json<Value>, AppError> {
    let deal = required_object(request.deal_data.as_ref(), "Deal data is required")?;
    let prediction = prediction::predict(state.llm.as_ref(), deal, &request).await;
    Ok(Json(json!({"success": true, "prediction": prediction})))
}

/// POST /api/ai/negotiation
pub async fn handle_negotiation(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NegotiationRequest>,
) -> Result<Json<Value>, AppError> {
    const MISSING: &str = "Negotiation type and deal data are required";
    let negotiation_type = required(request.negotiation_type.as_deref(), MISSING)?;
    let deal = required_object(request.deal_data.as_ref(), MISSING)?;
    let negotiation = negotiation::plan(state.llm.as_ref(), negotiation_type, deal, &request).await;
    Ok(Json(json!({"success": true, "negotiation": negotiation})))
}

/// POST /api/ai/risk-management
pub async fn handle_risk_management(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RiskRequest>,
) -> Result<Json<Value>, AppError> {
    let deal = required_object(request.deal_data.as_ref(), "Deal data is required")?;
    let risk_management = risk::assess(state.llm.as_ref(), deal, &request).await;
    Ok(Json(json!({"success": true, "risk_management": risk_management})))
}

/// POST /api/ai/market-intelligence
pub async fn handle_market_intelligence(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MarketRequest>,
) -> Result<Json<Value>, AppError> {
    let sector = required(request.sector.as_deref(), "Sector is required")?;
    let intelligence = market::intelligence(state.llm.as_ref(), sector, &request).await;
    Ok(Json(json!({"success": true, "intelligence": intelligence})))
}

/// POST /api/ai/reports
pub async fn handle_reports(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReportRequest>,
) -> Result<Json<Value>, AppError> {
    const MISSING: &str = "Report type and deal data are required";
    let report_type = required(request.report_type.as_deref(), MISSING)?;
    let deal = required_object(request.deal_data.as_ref(), MISSING)?;
    let report = reports::generate(state.llm.as_ref(), report_type, deal, &request).await;
    Ok(Json(json!({"success": true, "report": report})))
}

/// POST /api/ai/visualization
pub async fn handle_visualization(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VisualizationRequest>,
) -> Result<Json<Value>, AppError> {
    const MISSING: &str = "Visualization type and deal data are required";
    let visualization_type = required(request.visualization_type.as_deref(), MISSING)?;
    let deal = required_object(request.deal_data.as_ref(), MISSING)?;
    let visualization =
        visualization::visualize(state.llm.as_ref(), visualization_type, deal, &request).await;
    Ok(Json(json!({"success": true, "visualization": visualization})))
}

/// POST /api/ai/collaboration
pub async fn handle_collaboration(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CollaborationRequest>,
) -> Result<Json<Value>, AppError> {
    const MISSING: &str = "Collaboration type and team data are required";
    let collaboration_type = required(request.collaboration_type.as_deref(), MISSING)?;
    let team = required_object(request.team_data.as_ref(), MISSING)?;
    let collaboration =
        collaboration::design(state.llm.as_ref(), collaboration_type, team, &request).await;
    Ok(Json(json!({"success": true, "collaboration": collaboration})))
}

/// POST /api/ai/blockchain
pub async fn handle_blockchain(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BlockchainRequest>,
) -> Result<Json<Value>, AppError> {
    const MISSING: &str = "Blockchain type and deal data are required";
    let blockchain_type = required(request.blockchain_type.as_deref(), MISSING)?;
    let deal = required_object(request.deal_data.as_ref(), MISSING)?;
    let blockchain = blockchain::design(state.llm.as_ref(), blockchain_type, deal, &request).await;
    Ok(Json(json!({"success": true, "blockchain": blockchain})))
}
