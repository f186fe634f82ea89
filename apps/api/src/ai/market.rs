use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketRequest {
    pub sector: Option<String>,
    pub region: Option<String>,
    pub deal_type: Option<String>,
    pub timeframe: String,
    pub include_competitors: bool,
}

impl Default for MarketRequest {
    fn default() -> Self {
        Self {
            sector: None,
            region: None,
            deal_type: None,
            timeframe: "12m".to_string(),
            include_competitors: true,
        }
    }
}

fn growth_rate(doc: &Document) -> &str {
    doc.get("market_overview")
        .and_then(|o| facts::text(o, "growth_rate"))
        .unwrap_or("")
}

fn competitive_intensity(doc: &Document) -> &str {
    doc.get("competitive_landscape")
        .and_then(|c| facts::text(c, "competitive_intensity"))
        .unwrap_or("")
}

fn ai_insights(doc: &Document) -> Value {
    let ebitda = doc
        .get("valuation_trends")
        .and_then(|v| facts::text(v, "average_ebitda_multiple"))
        .unwrap_or("");
    let attractiveness = if growth_rate(doc).contains("8-12%") {
        "high"
    } else {
        "medium"
    };
    let positioning = if competitive_intensity(doc) == "high" {
        "challenging"
    } else {
        "favorable"
    };
    let outlook = if ebitda.contains("12-18x") {
        "premium"
    } else {
        "standard"
    };
    json!({
        "market_attractiveness": attractiveness,
        "competitive_positioning": positioning,
        "valuation_outlook": outlook,
        "risk_profile": "moderate",
        "recommended_strategy": "selective_acquisition",
        "key_success_factors": [
            "Technology leadership",
            "Operational efficiency",
            "Strategic partnerships"
        ]
    })
}

/// Base 50 plus growth and competition bonuses, minus 10 per high-probability
/// high-impact risk. Clamped to 0..=100.
pub fn market_score(doc: &Document) -> i32 {
    let mut score: i32 = 50;

    let growth = growth_rate(doc);
    if growth.contains("8-12%") {
        score += 20;
    } else if growth.contains("5-8%") {
        score += 15;
    }

    match competitive_intensity(doc) {
        "medium" => score += 10,
        "low" => score += 15,
        _ => {}
    }

    let severe = doc
        .get("risks")
        .and_then(Value::as_array)
        .map_or(0, |risks| {
            risks
                .iter()
                .filter(|r| facts::is(r, "probability", "high") && facts::is(r, "impact", "high"))
                .count()
        });
    score -= 10 * severe as i32;

    score.clamp(0, 100)
}

fn deal_opportunities() -> Value {
    json!({
        "primary_opportunities": [
            {
                "type": "strategic_acquisition",
                "description": "Acquisition of technology assets",
                "estimated_value": "USD 3-5B",
                "success_probability": 75
            },
            {
                "type": "market_expansion",
                "description": "Entry into new geographic markets",
                "estimated_value": "USD 2-3B",
                "success_probability": 65
            }
        ],
        "timing_recommendation": "next_6_months",
        "deal_structure": "cash_and_stock",
        "key_considerations": [
            "Regulatory approval",
            "Integration risks",
            "Synergy potential"
        ]
    })
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "market_overview": {
            "size": "USD 150-200B",
            "growth_rate": "8-12% per year",
            "trends": [
                "Digital transformation",
                "Market consolidation",
                "ESG focus",
                "Innovative technologies"
            ]
        },
        "competitive_landscape": {
            "key_players": [
                {
                    "name": "TechCorp Inc.",
                    "market_share": "15%",
                    "strengths": ["Strong technology base", "Global presence"],
                    "weaknesses": ["High debt", "Slow innovation"]
                },
                {
                    "name": "InnovateTech",
                    "market_share": "12%",
                    "strengths": ["Innovative products", "Agile culture"],
                    "weaknesses": ["Limited geography", "Volatile earnings"]
                }
            ],
            "competitive_intensity": "high"
        },
        "recent_ma_activity": [
            {
                "date": "2024-01-15",
                "buyer": "MegaCorp",
                "target": "StartupTech",
                "value": "USD 2.5B",
                "type": "acquisition"
            },
            {
                "date": "2024-02-20",
                "buyer": "GlobalTech",
                "target": "InnovateCorp",
                "value": "USD 1.8B",
                "type": "merger"
            }
        ],
        "valuation_trends": {
            "average_ebitda_multiple": "12-18x",
            "average_revenue_multiple": "3-5x",
            "valuation_drivers": [
                "Revenue growth",
                "Margins",
                "Technology assets",
                "Market position"
            ]
        },
        "opportunities": [
            {
                "type": "Consolidation",
                "description": "Combine with competitors to grow market share",
                "potential_value": "USD 5-10B",
                "timeframe": "18"
            },
            {
                "type": "Technology expansion",
                "description": "Acquire innovative startups",
                "potential_value": "USD 2-4B",
                "timeframe": "12"
            }
        ],
        "risks": [
            {
                "type": "Regulatory",
                "description": "Changes in antitrust legislation",
                "probability": "medium",
                "impact": "high"
            },
            {
                "type": "Technology",
                "description": "Rapid technology obsolescence",
                "probability": "high",
                "impact": "medium"
            }
        ],
        "regulatory_environment": {
            "overall_sentiment": "favorable",
            "key_regulations": ["Antitrust law", "Data protection", "Cybersecurity"],
            "compliance_requirements": ["Regular audits", "ESG reporting", "GDPR compliance"]
        }
    }))
}

pub async fn intelligence(llm: &dyn ChatModel, sector: &str, request: &MarketRequest) -> Document {
    let region = request.region.as_deref().unwrap_or("global");
    let deal_type = request.deal_type.as_deref().unwrap_or("all");

    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::MARKET_SYSTEM,
            prompt: prompts::market_intelligence(
                sector,
                region,
                deal_type,
                &request.timeframe,
                request.include_competitors,
            ),
            options: ChatOptions {
                temperature: 0.3,
                max_tokens: 2000,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(fallback_document);

    let insights = ai_insights(&doc);
    let score = market_score(&doc);
    doc.insert("ai_insights".to_string(), insights);
    doc.insert("market_score".to_string(), json!(score));
    doc.insert("deal_opportunities".to_string(), deal_opportunities());
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "sector": sector,
            "region": region,
            "deal_type": deal_type,
            "timeframe": request.timeframe,
            "generated_at": Utc::now(),
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
    fn test_market_score_of_fallback_is_70() {
        // 50 + 20 growth, no bonus for high intensity, no high/high risks
        assert_eq!(market_score(&fallback_document()), 70);
    }

    #[test]
    fn test_market_score_penalises_severe_risks() {
        let doc = gateway::into_document(json!({
            "competitive_landscape": {"competitive_intensity": "high"},
            "risks": [
                {"probability": "high", "impact": "high"},
                {"probability": "high", "impact": "high"},
                {"probability": "high", "impact": "low"}
            ]
        }));
        assert_eq!(market_score(&doc), 30);

        let grim = gateway::into_document(json!({
            "risks": (0..8).map(|_| json!({"probability": "high", "impact": "high"})).collect::<Vec<_>>()
        }));
        assert_eq!(market_score(&grim), 0);
    }

    #[test]
    fn test_request_defaults() {
        let req: MarketRequest = serde_json::from_value(json!({"sector": "tech"})).unwrap();
        assert_eq!(req.timeframe, "12m");
        assert!(req.include_competitors);
    }

    #[tokio::test]
    async fn test_fallback_intelligence() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let doc = intelligence(&llm, "technology", &MarketRequest::default()).await;
        assert_eq!(doc["market_score"], 70);
        assert_eq!(doc["ai_insights"]["market_attractiveness"], "high");
        assert_eq!(doc["ai_insights"]["competitive_positioning"], "challenging");
        assert_eq!(doc["ai_insights"]["valuation_outlook"], "premium");
        assert_eq!(doc["metadata"]["region"], "global");
        assert_eq!(doc["metadata"]["deal_type"], "all");
        assert_eq!(doc["deal_opportunities"]["timing_recommendation"], "next_6_months");
    }

    #[tokio::test]
    async fn test_live_intelligence_is_scored() {
        let llm = ScriptedModel::new(&[
            r#"{"market_overview": {"growth_rate": "5-8%"}, "competitive_landscape": {"competitive_intensity": "low"}}"#,
        ]);
        let doc = intelligence(&llm, "retail", &MarketRequest::default()).await;
        assert_eq!(doc["market_score"], 80);
        assert_eq!(doc["ai_insights"]["competitive_positioning"], "favorable");
        assert_eq!(doc["ai_insights"]["market_attractiveness"], "medium");
        assert_eq!(doc["metadata"]["model_used"], "scripted");
    }
}
