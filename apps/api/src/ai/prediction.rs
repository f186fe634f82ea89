//! Deal outcome prediction.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub deal_data: Option<Value>,
    pub market_context: Option<Value>,
    #[serde(default)]
    pub historical_data: Vec<Value>,
}

pub fn market_conditions(market: &Value) -> Value {
    let (sentiment, performance) = match facts::text(market, "market_trend") {
        Some("positive") => ("positive", "growing"),
        Some("negative") => ("negative", "declining"),
        _ => ("neutral", "stable"),
    };
    json!({
        "overall_sentiment": sentiment,
        "sector_performance": performance,
        "regulatory_environment": "favorable",
        "financing_conditions": "moderate",
        "competitive_intensity": "medium",
    })
}

/// Base 50, raised by cross-border scope, approvals, size and integration work;
/// lowered by precedent deals and a clean target. Clamped to 10..=100.
pub fn deal_complexity(deal: &Value) -> Value {
    let approvals = facts::count(deal, "regulatory_approvals");
    let large = facts::number(deal, "deal_size").is_some_and(|s| s > 100_000_000.0);

    let mut score: i32 = 50;
    if facts::flag(deal, "cross_border") {
        score += 20;
    }
    if approvals > 2 {
        score += 15;
    }
    if large {
        score += 10;
    }
    if facts::flag(deal, "integration_required") {
        score += 15;
    }
    if facts::flag(deal, "similar_previous_deals") {
        score -= 10;
    }
    if facts::flag(deal, "clean_target") {
        score -= 5;
    }
    let score = score.clamp(10, 100);
    let level = if score > 70 {
        "high"
    } else if score > 40 {
        "medium"
    } else {
        "low"
    };

    json!({
        "score": score,
        "level": level,
        "factors": {
            "cross_border": facts::flag(deal, "cross_border"),
            "regulatory_complexity": approvals,
            "size_factor": large,
            "integration_required": facts::flag(deal, "integration_required"),
        }
    })
}

pub fn competitive_landscape(deal: &Value, market: &Value) -> Value {
    let (intensity, bidders) = match facts::text(market, "sector") {
        Some("technology") => ("high", 4),
        _ => ("medium", 2),
    };
    let mut advantages = Vec::new();
    if facts::number(deal, "synergies").is_some_and(|s| s > 20.0) {
        advantages.push("High synergies");
    }
    if facts::is(deal, "financial_strength", "strong") {
        advantages.push("Strong financial position");
    }
    json!({
        "competitive_intensity": intensity,
        "potential_bidders": bidders,
        "competitive_advantages": advantages,
        "competitive_disadvantages": [],
        "market_position": "stable",
    })
}

/// 75 adjusted ±10 by market trend, clamped to 20..=95.
pub fn fallback_success_probability(market: &Value) -> i64 {
    let adjustment = match facts::text(market, "market_trend") {
        Some("positive") => 10,
        Some("negative") => -10,
        _ => 0,
    };
    (75 + adjustment).clamp(20, 95)
}

fn fallback_document(market: &Value) -> Document {
    let p = fallback_success_probability(market);
    gateway::into_document(json!({
        "success_probability": p,
        "completion_time_months": 6,
        "valuation_range": {"min": 1_000_000, "max": 5_000_000, "currency": "USD"},
        "key_factors": {
            "positive": [
                "Strong financial position of the target",
                "Strategic fit",
                "Operational synergies"
            ],
            "negative": ["Regulatory risk", "Integration challenges"],
            "neutral": ["Market conditions", "Competitive environment"]
        },
        "risk_assessment": {
            "financial_risk": "medium",
            "regulatory_risk": "low",
            "integration_risk": "medium",
            "market_risk": "low"
        },
        "synergy_potential": {
            "cost_synergies": "15-20% of operating costs",
            "revenue_synergies": "10-15% revenue growth",
            "total_synergy_value": "USD 2-3M"
        },
        "recommendations": [
            "Run detailed due diligence",
            "Build an integration plan",
            "Secure regulatory compliance"
        ],
        "confidence_intervals": {
            "success_probability": {"lower": (p - 15).max(20), "upper": (p + 15).min(95)},
            "completion_time": {"lower": 4, "upper": 8},
            "valuation": {"lower": 800_000, "upper": 6_000_000}
        }
    }))
}

pub async fn predict(llm: &dyn ChatModel, deal: &Value, request: &PredictRequest) -> Document {
    let market = request.market_context.clone().unwrap_or_else(|| json!({}));

    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::PREDICTION_SYSTEM,
            prompt: prompts::prediction(deal, &market, &request.historical_data),
            options: ChatOptions {
                temperature: 0.2,
                max_tokens: 1500,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(|| fallback_document(&market));

    let data_points = if stamp.is_fallback() {
        1
    } else {
        request.historical_data.len() + 1
    };
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "prediction_timestamp": Utc::now(),
            "data_points_analyzed": data_points,
        })),
    );
    doc.insert("market_analysis".to_string(), market_conditions(&market));
    doc.insert("deal_complexity".to_string(), deal_complexity(deal));
    doc.insert(
        "competitive_landscape".to_string(),
        competitive_landscape(deal, &market),
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmClient;

    #[test]
    fn test_fallback_probability_by_trend() {
        assert_eq!(fallback_success_probability(&json!({"market_trend": "positive"})), 85);
        assert_eq!(fallback_success_probability(&json!({"market_trend": "negative"})), 65);
        assert_eq!(fallback_success_probability(&json!({})), 75);
    }

    #[test]
    fn test_deal_complexity_scoring() {
        let deal = json!({
            "cross_border": true,
            "regulatory_approvals": ["EU", "US", "CN"],
            "deal_size": 250_000_000,
            "integration_required": true
        });
        let c = deal_complexity(&deal);
        assert_eq!(c["score"], 100);
        assert_eq!(c["level"], "high");
        assert_eq!(c["factors"]["regulatory_complexity"], 3);

        let simple = json!({"similar_previous_deals": true, "clean_target": true});
        let c = deal_complexity(&simple);
        assert_eq!(c["score"], 35);
        assert_eq!(c["level"], "low");
    }

    #[test]
    fn test_competitive_landscape() {
        let c = competitive_landscape(
            &json!({"synergies": 25, "financial_strength": "strong"}),
            &json!({"sector": "technology"}),
        );
        assert_eq!(c["potential_bidders"], 4);
        assert_eq!(c["competitive_advantages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_prediction() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let req = PredictRequest {
            market_context: Some(json!({"market_trend": "negative"})),
            historical_data: vec![json!({}), json!({})],
            ..Default::default()
        };
        let doc = predict(&llm, &json!({"deal_size": 10}), &req).await;
        assert_eq!(doc["success_probability"], 65);
        assert_eq!(doc["confidence_intervals"]["success_probability"]["lower"], 50);
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
        assert_eq!(doc["metadata"]["data_points_analyzed"], 1);
        assert_eq!(doc["market_analysis"]["sector_performance"], "declining");
    }

    #[tokio::test]
    async fn test_live_prediction_counts_history() {
        let llm = ScriptedModel::new(&[r#"{"success_probability": 88}"#]);
        let req = PredictRequest {
            historical_data: vec![json!({}), json!({})],
            ..Default::default()
        };
        let doc = predict(&llm, &json!({}), &req).await;
        assert_eq!(doc["success_probability"], 88);
        assert_eq!(doc["metadata"]["data_points_analyzed"], 3);
        assert_eq!(doc["deal_complexity"]["score"], 50);
    }
}
