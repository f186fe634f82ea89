use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationRequest {
    pub negotiation_type: Option<String>,
    pub deal_data: Option<Value>,
    pub counterparty_info: Option<Value>,
    pub current_stage: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// Base 70, clamped to 20..=95.
pub fn success_probability(deal: &Value, counterparty: &Value, objectives: usize) -> i32 {
    let mut p: i32 = 70;
    if facts::number(deal, "synergies").is_some_and(|s| s > 20.0) {
        p += 10;
    }
    if facts::is(counterparty, "financial_strength", "strong") {
        p += 5;
    }
    if objectives <= 3 {
        p += 5;
    }
    if facts::is(deal, "complexity", "high") {
        p -= 10;
    }
    if facts::is(counterparty, "negotiation_history", "difficult") {
        p -= 15;
    }
    p.clamp(20, 95)
}

fn ai_insights() -> Value {
    json!({
        "power_dynamics": "Balanced position with a slight buyer advantage",
        "key_leverage_points": [
            "Financial capacity",
            "Strategic necessity",
            "Operational synergies"
        ],
        "potential_deal_breakers": [
            "Regulatory obstacles",
            "Cultural differences",
            "Integration risks"
        ],
        "optimal_approach": "Collaborative with elements of firmness",
        "timing_recommendation": "Moderate pace balancing quality and efficiency"
    })
}

fn risk_assessment() -> Value {
    json!({
        "overall_risk_level": "medium",
        "key_risks": [
            {
                "risk": "Regulatory risk",
                "probability": "medium",
                "impact": "high",
                "mitigation": "Engage regulators early"
            },
            {
                "risk": "Integration risk",
                "probability": "high",
                "impact": "medium",
                "mitigation": "Detailed integration planning"
            },
            {
                "risk": "Financial risk",
                "probability": "low",
                "impact": "medium",
                "mitigation": "Structured financing"
            }
        ],
        "risk_score": 65
    })
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "negotiation_strategy": {
            "overall_approach": "Collaborative negotiation aimed at a mutually beneficial agreement",
            "key_principles": [
                "Transparency and openness",
                "Focus on shared interests",
                "Flexibility on terms",
                "Long-term partnership"
            ],
            "bargaining_power_analysis": {
                "our_strengths": ["Financial stability", "Industry expertise", "Strategic vision"],
                "our_weaknesses": ["Time constraints", "Limited alternatives"],
                "counterparty_strengths": ["Unique assets", "Market position"],
                "counterparty_weaknesses": ["Need for capital", "Competitive pressure"]
            }
        },
        "tactical_recommendations": [
            {
                "stage": "Preparation",
                "recommendations": [
                    "Run a detailed counterparty analysis",
                    "Define the BATNA",
                    "Prepare alternative offers"
                ],
                "key_messages": ["Shared value creation", "Strategic partnership"],
                "red_lines": ["Minimum deal price", "Key closing conditions"]
            },
            {
                "stage": "Negotiation",
                "recommendations": [
                    "Open on shared interests",
                    "Use objective criteria",
                    "Make concessions gradually"
                ],
                "key_messages": ["Mutual benefit", "Long-term perspective"],
                "red_lines": ["Core transaction terms"]
            }
        ],
        "communication_strategy": {
            "tone": "professional",
            "key_messaging": ["Strategic partnership", "Value creation", "Shared vision"],
            "presentation_focus": ["Synergies", "Growth prospects", "Risk sharing"],
            "objection_handling": [
                {
                    "objection": "Price is too high",
                    "response": "Walk through the value creation and synergy case"
                },
                {
                    "objection": "Integration risk",
                    "response": "Present a detailed integration plan"
                }
            ]
        },
        "deal_structure_recommendations": {
            "payment_terms": "Cash and stock in a 70/30 split",
            "earn_out_structure": "Up to 20% of the price payable on KPI achievement",
            "escrow_requirements": "10% escrow for 18 months",
            "closing_conditions": [
                "Regulatory approvals",
                "Successful due diligence",
                "Key employee retention"
            ]
        },
        "timeline_strategy": {
            "optimal_timing": "Close within 3-6 months",
            "milestones": [
                {
                    "milestone": "Letter of intent signed",
                    "target_date": "2 weeks",
                    "dependencies": ["Initial negotiations"]
                },
                {
                    "milestone": "Due diligence complete",
                    "target_date": "8 weeks",
                    "dependencies": ["Data room access"]
                },
                {
                    "milestone": "Definitive agreement signed",
                    "target_date": "12 weeks",
                    "dependencies": ["Agreement on key terms"]
                }
            ],
            "pressure_points": ["Competing bidders", "Time pressure", "Financing terms"]
        }
    }))
}

pub async fn plan(
    llm: &dyn ChatModel,
    negotiation_type: &str,
    deal: &Value,
    request: &NegotiationRequest,
) -> Document {
    let counterparty = request.counterparty_info.clone().unwrap_or_else(|| json!({}));
    let stage = request.current_stage.as_deref().unwrap_or("initial");

    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::NEGOTIATION_SYSTEM,
            prompt: prompts::negotiation(
                negotiation_type,
                deal,
                &counterparty,
                stage,
                &request.objectives,
                &request.constraints,
            ),
            options: ChatOptions {
                temperature: 0.3,
                max_tokens: 2000,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(fallback_document);

    doc.insert("ai_insights".to_string(), ai_insights());
    doc.insert("risk_assessment".to_string(), risk_assessment());
    doc.insert(
        "success_probability".to_string(),
        json!(success_probability(deal, &counterparty, request.objectives.len())),
    );
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "negotiation_type": negotiation_type,
            "current_stage": stage,
            "deal_value": facts::display_or_unknown(deal, "value"),
            "created_at": Utc::now(),
        })),
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
    fn test_success_probability_adjustments() {
        let deal = json!({"synergies": 30});
        let cp = json!({"financial_strength": "strong"});
        assert_eq!(success_probability(&deal, &cp, 2), 90);

        let hard = json!({"complexity": "high"});
        let cp = json!({"negotiation_history": "difficult"});
        assert_eq!(success_probability(&hard, &cp, 5), 45);
    }

    #[test]
    fn test_success_probability_is_capped() {
        let deal = json!({"synergies": 90});
        let cp = json!({"financial_strength": "strong"});
        assert!(success_probability(&deal, &cp, 0) <= 95);
    }

    #[tokio::test]
    async fn test_fallback_plan() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let req = NegotiationRequest::default();
        let doc = plan(&llm, "acquisition", &json!({"value": 45_000_000}), &req).await;
        assert_eq!(doc["communication_strategy"]["tone"], "professional");
        assert_eq!(doc["metadata"]["current_stage"], "initial");
        assert_eq!(doc["metadata"]["deal_value"], 45_000_000);
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
        assert_eq!(doc["risk_assessment"]["risk_score"], 65);
        assert_eq!(doc["success_probability"], 75);
    }

    #[tokio::test]
    async fn test_live_plan_uses_type_focus() {
        let llm = ScriptedModel::new(&[r#"{"negotiation_strategy": {"overall_approach": "firm"}}"#]);
        let req = NegotiationRequest::default();
        let doc = plan(&llm, "merger", &json!({}), &req).await;
        assert_eq!(doc["negotiation_strategy"]["overall_approach"], "firm");
        assert_eq!(doc["metadata"]["model_used"], "scripted");
        assert_eq!(doc["metadata"]["deal_value"], "unknown");

        let seen = llm.seen.lock();
        assert!(seen[0][1].content.contains("Synergy identification"));
    }
}
