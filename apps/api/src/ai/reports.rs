//! Deal report writer: free-form markdown from the model, or a templated demo
//! report, split into sections with the executive summary pulled out.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, Document, ModelStamp};
use crate::ai::prompts;
use crate::llm_client::{ChatMessage, ChatModel, ChatOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    pub report_type: Option<String>,
    pub deal_data: Option<Value>,
    pub analysis_data: Value,
    pub prediction_data: Value,
    pub format: String,
    pub language: String,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self {
            report_type: None,
            deal_data: None,
            analysis_data: Value::Null,
            prediction_data: Value::Null,
            format: "markdown".to_string(),
            language: "en".to_string(),
        }
    }
}

const NO_SUMMARY: &str = "The executive summary will be generated automatically.";

/// `deal[key]` as display text, or `default` when missing or empty.
fn field_or(deal: &Value, key: &str, default: &str) -> String {
    match deal.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn valuation_range(prediction: &Value) -> (f64, f64, f64) {
    let range = prediction.get("valuation_range");
    let max = range
        .and_then(|r| facts::number(r, "max"))
        .unwrap_or(5_000_000.0);
    match range.and_then(|r| facts::number(r, "min")) {
        Some(min) => (min, max, (min + max) / 2.0),
        None => (1_000_000.0, max, 3_000_000.0),
    }
}

/// Templated report used when the model is unavailable. Unknown report types
/// get the due-diligence template.
pub fn demo_report(report_type: &str, deal: &Value, prediction: &Value) -> String {
    let revenue = field_or(deal, "revenue", "USD 5-10M");
    let ebitda = field_or(deal, "ebitda", "USD 1-2M");
    match report_type {
        "investment_memo" => "# Investment Memorandum

## Investment Thesis
The proposed deal is an attractive opportunity to create value through synergies and operational improvements.

## Market Opportunity
- Market size: growing segment
- Competitive environment: moderate competition
- Trends: positive

## Financial Projections
- Revenue outlook: 15-20% growth per year
- EBITDA margin: 20-25%
- ROI: 25-30%

## Risks
- Integration risk: medium
- Market risk: low
- Regulatory risk: minimal

## Recommendation
We recommend approving the deal subject to completion of due diligence."
            .to_string(),
        "synergy_analysis" => "# Synergy Analysis

## Executive Summary
There is potential to create value through operational and financial synergies.

## Operational Synergies
- Cost reduction: 15-20%
- Process optimisation: 10-15%
- Economies of scale: 5-10%

## Financial Synergies
- Improved cash flows
- Optimised capital structure
- Lower cost of capital

## Value Creation Potential
- Total synergy value: USD 2-3M
- Realisation period: 18-24 months
- Probability of success: 75%"
            .to_string(),
        "risk_assessment" => "# Risk Assessment

## Executive Summary
A comprehensive risk assessment of the M&A deal has been carried out.

## Financial Risks
- Level: medium
- Mitigation: detailed financial analysis

## Operational Risks
- Level: low
- Mitigation: integration plan

## Legal Risks
- Level: low
- Mitigation: legal review

## Market Risks
- Level: medium
- Mitigation: market monitoring

## Overall Risk Level: Medium"
            .to_string(),
        "valuation_report" => {
            let (min, max, recommended) = valuation_range(prediction);
            format!(
                "# Valuation Report

## Valuation Methodology
Methods used: DCF, comparable companies, comparable transactions.

## Financial Analysis
- Revenue: {revenue}
- EBITDA: {ebitda}
- Growth: 10-15% per year

## Valuation
- Range: {min} - {max} USD
- Recommended price: {recommended} USD

## Key Assumptions
- Stable market growth
- Operating efficiency is maintained
- Successful integration

## Conclusion
The recommended valuation is justified and in line with market benchmarks."
            )
        }
        _ => {
            let debt = field_or(deal, "debt", "USD 2-3M");
            format!(
                "# Due Diligence Report

## Executive Summary
A comprehensive review of the target company has been completed as part of the M&A deal. Key risks and value creation opportunities have been identified.

## Financial Analysis
- Revenue: {revenue}
- EBITDA: {ebitda}
- Debt load: {debt}

## Legal Analysis
- Corporate structure: standard
- Regulatory risks: low
- Legal review required

## Operational Analysis
- Business processes: efficient
- Technology platform: modern
- Staff: qualified

## Recommendations
1. Carry out a detailed financial review
2. Organise legal due diligence
3. Prepare an integration plan"
            )
        }
    }
}

/// Splits a markdown report on heading lines; other formats have no sections.
pub fn extract_sections(content: &str, format: &str) -> Map<String, Value> {
    let mut sections = Map::new();
    if format != "markdown" {
        return sections;
    }
    let mut current: Option<String> = None;
    let mut body = String::new();
    for line in content.lines() {
        if line.starts_with('#') {
            if let Some(title) = current.take() {
                sections.insert(title, Value::String(body.trim().to_string()));
            }
            current = Some(line.trim_start_matches('#').trim().to_string());
            body.clear();
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    if let Some(title) = current {
        sections.insert(title, Value::String(body.trim().to_string()));
    }
    sections
}

/// Text between an "Executive summary" heading and the next heading.
pub fn executive_summary(content: &str) -> String {
    let mut lines = content.lines();
    let mut summary = String::new();
    for line in lines.by_ref() {
        let lower = line.to_lowercase();
        if lower.contains("executive summary") || lower.contains("исполнительное резюме") {
            break;
        }
    }
    for line in lines {
        if line.starts_with('#') {
            break;
        }
        summary.push_str(line);
        summary.push('\n');
    }
    let summary = summary.trim();
    if summary.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        summary.to_string()
    }
}

pub async fn generate(
    llm: &dyn ChatModel,
    report_type: &str,
    deal: &Value,
    request: &ReportRequest,
) -> Document {
    let messages = [
        ChatMessage::system(prompts::report_system(&request.language, &request.format)),
        ChatMessage::user(prompts::report(
            report_type,
            deal,
            &request.analysis_data,
            &request.prediction_data,
            &request.format,
            &request.language,
        )),
    ];
    let options = ChatOptions {
        temperature: 0.3,
        max_tokens: 2000,
    };
    let (content, stamp) = match gateway::complete_text(llm, &messages, options).await {
        Ok(reply) => {
            let stamp = ModelStamp::live(reply.model, reply.tokens_used);
            (reply.text, stamp)
        }
        Err(reason) => (
            demo_report(report_type, deal, &request.prediction_data),
            ModelStamp::fallback(&reason),
        ),
    };

    let mut doc = Document::new();
    doc.insert(
        "sections".to_string(),
        Value::Object(extract_sections(&content, &request.format)),
    );
    doc.insert("summary".to_string(), json!(executive_summary(&content)));
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "report_type": report_type,
            "format": request.format,
            "language": request.language,
            "generated_at": Utc::now(),
            "deal_id": facts::display_or_unknown(deal, "id"),
        })),
    );
    doc.insert("content".to_string(), Value::String(content));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmClient;

    #[test]
    fn test_sections_split_on_headings() {
        let sections = extract_sections("# Title\nintro\n## Risks\n- one\n- two\n", "markdown");
        assert_eq!(sections["Title"], "intro");
        assert_eq!(sections["Risks"], "- one\n- two");
        assert!(extract_sections("# Title\nintro", "html").is_empty());
    }

    #[test]
    fn test_executive_summary_stops_at_next_heading() {
        let report = "# Memo\n## Executive Summary\nStrong fit.\nLow risk.\n## Details\nmore";
        assert_eq!(executive_summary(report), "Strong fit.\nLow risk.");
        assert_eq!(executive_summary("# Memo\nno summary here"), NO_SUMMARY);
    }

    #[test]
    fn test_valuation_template_uses_prediction_range() {
        let prediction = json!({"valuation_range": {"min": 2000000, "max": 4000000}});
        let report = demo_report("valuation_report", &json!({"revenue": "USD 12M"}), &prediction);
        assert!(report.contains("Range: 2000000 - 4000000 USD"));
        assert!(report.contains("Recommended price: 3000000 USD"));
        assert!(report.contains("Revenue: USD 12M"));

        let report = demo_report("valuation_report", &json!({}), &Value::Null);
        assert!(report.contains("Range: 1000000 - 5000000 USD"));
        assert!(report.contains("Revenue: USD 5-10M"));
    }

    #[test]
    fn test_unknown_type_gets_due_diligence_template() {
        let report = demo_report("board_pack", &json!({"debt": 7}), &Value::Null);
        assert!(report.starts_with("# Due Diligence Report"));
        assert!(report.contains("Debt load: 7"));
    }

    #[tokio::test]
    async fn test_fallback_report() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let deal = json!({"id": "deal-9"});
        let doc = generate(&llm, "synergy_analysis", &deal, &ReportRequest::default()).await;
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
        assert_eq!(doc["metadata"]["deal_id"], "deal-9");
        assert_eq!(doc["metadata"]["format"], "markdown");
        assert!(doc["summary"].as_str().unwrap().starts_with("There is potential"));
        assert!(doc["sections"]["Operational Synergies"].is_string());
    }

    #[tokio::test]
    async fn test_live_report_keeps_model_text() {
        let llm = ScriptedModel::new(&["# Memo\n## Executive Summary\nBuy.\n## Risks\nFew."]);
        let doc = generate(&llm, "investment_memo", &json!({}), &ReportRequest::default()).await;
        assert_eq!(doc["summary"], "Buy.");
        assert_eq!(doc["sections"]["Risks"], "Few.");
        assert_eq!(doc["metadata"]["model_used"], "scripted");
        assert_eq!(doc["metadata"]["tokens_used"], 42);
        assert_eq!(doc["metadata"]["deal_id"], "unknown");
        assert!(doc["metadata"].get("fallback_reason").is_none());
        let seen = llm.seen.lock();
        assert!(seen[0][0].content.contains("markdown format"));
    }
}
