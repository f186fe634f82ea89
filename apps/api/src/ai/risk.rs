//! Risk-management analysis with a local scorecard and per-strategy effectiveness.

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskRequest {
    pub deal_data: Option<Value>,
    pub risk_type: String,
    pub risk_tolerance: String,
    pub mitigation_strategies: Vec<String>,
    pub monitoring_frequency: String,
}

impl Default for RiskRequest {
    fn default() -> Self {
        Self {
            deal_data: None,
            risk_type: "comprehensive".to_string(),
            risk_tolerance: "medium".to_string(),
            mitigation_strategies: Vec::new(),
            monitoring_frequency: "weekly".to_string(),
        }
    }
}

fn raw_risk_score(deal: &Value) -> u32 {
    let mut score: u32 = 70;
    if facts::is(deal, "complexity", "high") {
        score += 15;
    }
    if facts::number(deal, "size").is_some_and(|s| s > 1_000_000_000.0) {
        score += 10;
    }
    if facts::flag(deal, "cross_border") {
        score += 10;
    }
    if facts::count(deal, "regulatory_approvals") > 2 {
        score += 5;
    }
    score
}

fn risk_level(score: u32) -> &'static str {
    if score > 80 {
        "high"
    } else if score > 60 {
        "medium"
    } else {
        "low"
    }
}

/// Scorecard; the level and interval come from the uncapped score.
pub fn risk_scoring(deal: &Value) -> Value {
    let raw = raw_risk_score(deal);
    json!({
        "overall_score": raw.min(100),
        "risk_level": risk_level(raw),
        "confidence_interval": {
            "lower": raw.saturating_sub(10),
            "upper": (raw + 10).min(100),
        }
    })
}

pub fn mitigation_effectiveness(strategies: &[String], rng: &mut impl Rng) -> Value {
    let per_strategy: Vec<Value> = strategies
        .iter()
        .map(|strategy| {
            json!({
                "strategy": strategy,
                "effectiveness": rng.random_range(70..100),
                "implementation_difficulty": rng.random_range(1..=3),
                "cost_benefit_ratio": rng.random_range(1..=2),
            })
        })
        .collect();
    json!({
        "overall_effectiveness": 75,
        "strategy_effectiveness": per_strategy,
        "recommendations": [
            "Prioritise strategies with the best effectiveness to cost ratio",
            "Focus on quick wins",
            "Review strategy effectiveness continuously"
        ]
    })
}

fn ai_insights() -> Value {
    json!({
        "primary_risk_factors": [
            "Integration challenges",
            "Regulatory change",
            "Market volatility"
        ],
        "risk_trends": "Moderate growth in risk driven by market uncertainty",
        "key_mitigation_opportunities": [
            "Early integration planning",
            "Proactive management of regulatory risk",
            "Risk diversification"
        ],
        "risk_correlation_analysis": "High correlation between operational and integration risks"
    })
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "risk_assessment": {
            "financial_risks": [
                {
                    "risk": "Overpaying for the asset",
                    "probability": "medium",
                    "impact": "high",
                    "mitigation": "Independent valuation and price adjustment mechanisms",
                    "monitoring": "Quarterly review of financial results"
                },
                {
                    "risk": "Financing risk",
                    "probability": "low",
                    "impact": "high",
                    "mitigation": "Diversified funding sources",
                    "monitoring": "Daily liquidity tracking"
                }
            ],
            "operational_risks": [
                {
                    "risk": "Integration difficulties",
                    "probability": "high",
                    "impact": "medium",
                    "mitigation": "Detailed integration plan and a dedicated team",
                    "monitoring": "Weekly integration progress reports"
                }
            ],
            "legal_risks": [
                {
                    "risk": "Regulatory restrictions",
                    "probability": "medium",
                    "impact": "high",
                    "mitigation": "Early engagement with regulators",
                    "monitoring": "Ongoing tracking of regulatory change"
                }
            ],
            "strategic_risks": [
                {
                    "risk": "Loss of key customers",
                    "probability": "medium",
                    "impact": "high",
                    "mitigation": "Customer retention programme",
                    "monitoring": "Monthly customer satisfaction review"
                }
            ],
            "integration_risks": [],
            "regulatory_risks": []
        },
        "mitigation_framework": {
            "immediate_actions": [
                "Form a risk management team",
                "Run a detailed risk assessment",
                "Build contingency plans"
            ],
            "short_term_mitigations": [
                "Introduce a monitoring system",
                "Train the team",
                "Set up reporting"
            ],
            "long_term_strategies": [
                "Build a risk culture",
                "Continuously improve processes",
                "Automate monitoring"
            ],
            "contingency_plans": [
                "Deal exit plan",
                "Alternative financing sources",
                "Crisis response plan"
            ]
        },
        "monitoring_dashboard": {
            "key_risk_indicators": [
                "Financial metrics of the target",
                "Integration progress",
                "Customer satisfaction",
                "Key employee retention"
            ],
            "alert_thresholds": {
                "high_risk": "Deviation above 20%",
                "medium_risk": "Deviation of 10-20%",
                "low_risk": "Deviation below 10%"
            },
            "reporting_frequency": "Weekly reports for management"
        },
        "compliance_framework": {
            "regulatory_requirements": ["Antitrust law", "Corporate law", "Tax law"],
            "compliance_risks": ["Breach of disclosure requirements", "Non-compliance with approvals"],
            "monitoring_mechanisms": ["Regular audits", "Legal review", "Compliance reporting"]
        }
    }))
}

pub async fn assess(llm: &dyn ChatModel, deal: &Value, request: &RiskRequest) -> Document {
    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::RISK_SYSTEM,
            prompt: prompts::risk_management(
                deal,
                &request.risk_type,
                &request.risk_tolerance,
                &request.mitigation_strategies,
                &request.monitoring_frequency,
            ),
            options: ChatOptions {
                temperature: 0.2,
                max_tokens: 2000,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(fallback_document);

    doc.insert("ai_insights".to_string(), ai_insights());
    doc.insert("risk_scoring".to_string(), risk_scoring(deal));
    doc.insert(
        "mitigation_effectiveness".to_string(),
        mitigation_effectiveness(&request.mitigation_strategies, &mut rand::rng()),
    );
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "risk_type": request.risk_type,
            "risk_tolerance": request.risk_tolerance,
            "deal_value": facts::display_or_unknown(deal, "value"),
            "created_at": Utc::now(),
        })),
    );
    doc
}
