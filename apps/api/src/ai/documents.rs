//! Document analysis: model summary plus local regex extraction and sentiment.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub content: Option<String>,
    pub document_type: Option<String>,
    pub context: Option<Value>,
}

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?%").unwrap());

static DATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{1,2}/\d{1,2}/\d{4}",
        r"\d{4}-\d{2}-\d{2}",
        r"\d{1,2}\.\d{1,2}\.\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static COMPANIES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[A-Z][a-z]+ (?:Inc|Corp|LLC|Ltd|GmbH|SA|NV)",
        r#"ООО "[^"]+""#,
        r#"АО "[^"]+""#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CURRENCIES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\$\d+(?:\.\d+)?",
        r"€\d+(?:\.\d+)?",
        r"₽\d+(?:\.\d+)?",
        r"\d+(?:\.\d+)? (?:USD|EUR|RUB|GBP)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static POSITIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)success|growth|profit|benefit|opportunit|potential|synerg|успех|рост|прибыль|выгода|возможность|потенциал|синергия").unwrap()
});
static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)risk|problem|loss|danger|complex|conflict|риск|проблема|потеря|убыток|опасность|сложность|конфликт").unwrap()
});
static NEUTRAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)analysis|research|review|report|document|information|анализ|исследование|обзор|отчет|документ|информация").unwrap()
});

#[derive(Debug, Serialize, PartialEq)]
pub struct ExtractedData {
    pub numbers: Vec<f64>,
    pub dates: Vec<String>,
    pub companies: Vec<String>,
    pub currencies: Vec<String>,
    pub percentages: Vec<String>,
}

fn all_matches(patterns: &[Regex], text: &str) -> Vec<String> {
    patterns
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str().to_string()))
        .collect()
}

pub fn extract(text: &str) -> ExtractedData {
    ExtractedData {
        numbers: NUMBER
            .find_iter(text)
            .filter_map(|m| m.as_str().parse().ok())
            .collect(),
        dates: all_matches(&DATES, text),
        companies: all_matches(&COMPANIES, text),
        currencies: all_matches(&CURRENCIES, text),
        percentages: PERCENTAGE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SentimentScores {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Sentiment {
    pub sentiment: &'static str,
    pub scores: SentimentScores,
    pub confidence: f64,
}

/// Counts every keyword occurrence; confidence is the positive/negative margin
/// over all hits, 0 when nothing matched.
pub fn sentiment(text: &str) -> Sentiment {
    let positive = POSITIVE.find_iter(text).count();
    let negative = NEGATIVE.find_iter(text).count();
    let neutral = NEUTRAL.find_iter(text).count();

    let label = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => "positive",
        std::cmp::Ordering::Less => "negative",
        std::cmp::Ordering::Equal => "neutral",
    };
    let total = positive + negative + neutral;
    let confidence = if total == 0 {
        0.0
    } else {
        positive.abs_diff(negative) as f64 / total as f64
    };

    Sentiment {
        sentiment: label,
        scores: SentimentScores {
            positive,
            negative,
            neutral,
        },
        confidence,
    }
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "summary": "Demo analysis of the document with key M&A insights",
        "key_findings": [
            "The document contains material financial information",
            "Potential synergies identified",
            "Additional due diligence required"
        ],
        "risks": [
            "Potential legal exposure",
            "Financial obligations need attention"
        ],
        "opportunities": [
            "Operational synergy opportunities",
            "Value growth potential"
        ],
        "financial_metrics": {
            "revenue": "USD 5-10M",
            "ebitda": "USD 1-2M",
            "debt": "USD 2-3M"
        },
        "legal_considerations": [
            "Legal review required",
            "Check regulatory compliance"
        ],
        "recommendations": [
            "Run a detailed financial analysis",
            "Organise legal due diligence"
        ],
        "confidence_score": 75,
        "urgency_level": "medium",
        "deal_impact": "positive"
    }))
}

pub async fn analyze(llm: &dyn ChatModel, content: &str, request: &AnalyzeRequest) -> Document {
    let document_type = request.document_type.as_deref().unwrap_or("document");
    let context = request.context.clone().unwrap_or_else(|| json!({}));

    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::DOCUMENT_SYSTEM,
            prompt: prompts::document_analysis(content, document_type, &context),
            options: ChatOptions {
                temperature: 0.3,
                max_tokens: 1000,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(fallback_document);

    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "document_type": request.document_type.as_deref().unwrap_or("unknown"),
            "content_length": content.chars().count(),
            "analysis_timestamp": Utc::now(),
        })),
    );
    doc.insert("extracted_data".to_string(), json!(extract(content)));
    doc.insert("sentiment_analysis".to_string(), json!(sentiment(content)));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmClient;

    const SAMPLE: &str = "Acme Corp will acquire Beta Inc for $45.5 and 120 USD on 2024-03-15. \
        Margins grew 12.5% since 01/02/2023. ООО \"Ромашка\" signed on 15.04.2024.";

    #[test]
    fn test_extract_structured_data() {
        let data = extract(SAMPLE);
        assert_eq!(data.companies, vec!["Acme Corp", "Beta Inc", "ООО \"Ромашка\""]);
        assert_eq!(data.dates, vec!["01/02/2023", "2024-03-15", "15.04.2024"]);
        assert_eq!(data.currencies, vec!["$45.5", "120 USD"]);
        assert_eq!(data.percentages, vec!["12.5%"]);
        assert!(data.numbers.contains(&45.5));
    }

    #[test]
    fn test_sentiment_counts_every_occurrence() {
        let s = sentiment("Growth, growth and more growth despite one risk.");
        assert_eq!(s.scores.positive, 3);
        assert_eq!(s.scores.negative, 1);
        assert_eq!(s.sentiment, "positive");
        assert!((s.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment_without_keywords_has_zero_confidence() {
        let s = sentiment("The quick brown fox.");
        assert_eq!(s.sentiment, "neutral");
        assert_eq!(s.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_fallback_analysis_keeps_local_fields() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let req = AnalyzeRequest::default();
        let doc = analyze(&llm, SAMPLE, &req).await;
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
        assert_eq!(doc["metadata"]["document_type"], "unknown");
        assert_eq!(doc["confidence_score"], 75);
        assert_eq!(doc["extracted_data"]["percentages"][0], "12.5%");
    }

    #[tokio::test]
    async fn test_live_analysis_is_enriched() {
        let llm = ScriptedModel::new(&["```json\n{\"summary\": \"Share purchase agreement\"}\n```"]);
        let req = AnalyzeRequest {
            document_type: Some("contract".to_string()),
            ..Default::default()
        };
        let doc = analyze(&llm, SAMPLE, &req).await;
        assert_eq!(doc["summary"], "Share purchase agreement");
        assert_eq!(doc["metadata"]["model_used"], "scripted");
        assert_eq!(doc["metadata"]["tokens_used"], 42);
        assert!(doc["sentiment_analysis"]["scores"].is_object());
    }
}
