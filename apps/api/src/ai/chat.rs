//! Advisory chat: one model call for the reply, a second to classify it.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::gateway::{self, CompletionRequest, Document, FallbackReason, Outcome, FALLBACK_MODEL};
use crate::ai::prompts;
use crate::llm_client::{ChatMessage, ChatModel, ChatOptions};

const ANALYSIS_VERSION: &str = "2.0";

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub context: Option<Value>,
}

static RECOMMENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)recommend|should|need to|important|рекомендую|следует|нужно|важно").unwrap()
});
static RISKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)risk|danger|problem|challeng|риск|опасность|проблема|сложность").unwrap()
});
static OPPORTUNITIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)opportunit|potential|prospect|benefit|возможность|потенциал|перспектива|выгода").unwrap()
});
static POSITIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)excellent|success|effective|good|strong|отличный|успешный|эффективный|хороший").unwrap()
});
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

static TOPICS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("M&A", r"(?i)M&A|merger|acquisition|deal|слияние|поглощение|сделка"),
        ("valuation", r"(?i)valuation|multiple|EBITDA|оценка|стоимость|мультипликатор"),
        ("due_diligence", r"(?i)due diligence|audit|documents|проверка|анализ|документы"),
        ("financial", r"(?i)financial|cash flow|profit|revenue|финансовый|денежный поток|прибыль|доход"),
        ("legal", r"(?i)legal|law|regulat|правовой|юридический|закон|регулирование"),
        ("market", r"(?i)market|competition|trend|рынок|конкуренция|тренд"),
    ]
    .into_iter()
    .map(|(topic, pattern)| (topic, Regex::new(pattern).unwrap()))
    .collect()
});

fn words_per_sentence(text: &str) -> f64 {
    let words = text.split(' ').count() as f64;
    let sentences = SENTENCE_BREAK.split(text).count().max(1) as f64;
    words / sentences
}

/// 30, 60 or 90 by average sentence length.
pub fn complexity_score(text: &str) -> u8 {
    match words_per_sentence(text) {
        avg if avg < 10.0 => 30,
        avg if avg < 15.0 => 60,
        _ => 90,
    }
}

/// Simplified Flesch reading ease, clamped to 0..=100.
pub fn readability_score(text: &str) -> f64 {
    (206.835 - 1.015 * words_per_sentence(text)).clamp(0.0, 100.0)
}

pub fn extract_topics(text: &str) -> Vec<&'static str> {
    let topics: Vec<&'static str> = TOPICS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(topic, _)| *topic)
        .collect();
    if topics.is_empty() {
        vec!["general"]
    } else {
        topics
    }
}

fn computed_fields(reply: &str) -> Value {
    json!({
        "response_length": reply.chars().count(),
        "complexity_score": complexity_score(reply),
        "readability_score": readability_score(reply),
        "timestamp": Utc::now(),
        "analysis_version": ANALYSIS_VERSION,
    })
}

/// Keyword classifier used when the model cannot classify its own reply.
pub fn heuristic_analysis(reply: &str) -> Document {
    let recommends = RECOMMENDS.is_match(reply);
    let risky = RISKS.is_match(reply);
    let opportune = OPPORTUNITIES.is_match(reply);

    let kind = if recommends {
        "recommendation"
    } else if risky {
        "risk"
    } else if opportune {
        "opportunity"
    } else {
        "insight"
    };
    let sentiment = if POSITIVE.is_match(reply) {
        "positive"
    } else if risky {
        "negative"
    } else {
        "neutral"
    };
    let actions: Vec<&str> = if recommends {
        vec!["review_documentation", "conduct_analysis"]
    } else {
        Vec::new()
    };

    let mut doc = gateway::into_document(json!({
        "type": kind,
        "confidence": 75,
        "impact": "medium",
        "actionable": recommends,
        "sentiment": sentiment,
        "emotion": "neutral",
        "specificity": "medium",
        "urgency": "medium",
        "key_topics": extract_topics(reply),
        "recommended_actions": actions,
        "risk_level": if risky { "medium" } else { "low" },
        "opportunity_score": if opportune { 70 } else { 30 },
    }));
    doc.extend(gateway::into_document(computed_fields(reply)));
    doc
}

async fn classify_reply(llm: &dyn ChatModel, user_message: &str, reply: &str) -> Document {
    let request = CompletionRequest {
        system: prompts::REPLY_ANALYZER_SYSTEM,
        prompt: prompts::reply_analysis(user_message, reply),
        options: ChatOptions {
            temperature: 0.1,
            max_tokens: 500,
        },
    };
    match gateway::complete_json(llm, request).await {
        Outcome::Live { mut value, .. } => {
            value.extend(gateway::into_document(computed_fields(reply)));
            value
        }
        Outcome::Fallback(_) => heuristic_analysis(reply),
    }
}

const DUE_DILIGENCE_REPLY: &str = "For due diligence, focus on: 1) Financial analysis - review 3 years of statements, 2) Legal review - contracts, IP, compliance, 3) Operational assessment - processes, systems, 4) Market analysis - competition, growth potential. Would you like me to elaborate on any specific area?";
const VALUATION_REPLY: &str = "Valuation methods include: 1) DCF analysis for future cash flows, 2) Comparable company analysis, 3) Precedent transactions, 4) Asset-based valuation. The most appropriate method depends on the company's stage and industry. What type of business are you valuing?";
const RISK_REPLY: &str = "Key M&A risks include: 1) Integration challenges, 2) Cultural differences, 3) Regulatory approvals, 4) Market changes, 5) Customer retention. Mitigation strategies should be developed for each identified risk. What specific risks concern you most?";
const GENERAL_REPLIES: &[&str] = &[
    "I understand your question about M&A analysis. I recommend starting with a thorough review of the target's financials. Key metrics include EBITDA, cash flows and leverage.",
    "Great question! In M&A transactions it is important to weigh strategic synergies as well as the financials. I suggest analysing: 1) Operational synergies 2) Financial synergies 3) Market opportunities.",
    "Quality due diligence is critical to a successful deal. Core areas to review: financial statements, legal matters, operations, technology and IP, HR and corporate culture.",
    "I see potential for significant value creation here. Key success factors: 1) Sound valuation 2) Deal structure 3) Integration plan 4) Risk management. Happy to go through each in detail.",
    "In current market conditions pay particular attention to ESG factors and digital transformation when assessing M&A opportunities. Companies with strong ESG profiles and digital assets command higher valuation multiples.",
];

/// Canned reply chosen by topic of the user's message.
pub fn fallback_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("due diligence") {
        DUE_DILIGENCE_REPLY
    } else if lower.contains("valuation") {
        VALUATION_REPLY
    } else if lower.contains("risk") {
        RISK_REPLY
    } else {
        GENERAL_REPLIES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(GENERAL_REPLIES[0])
    }
}

fn fallback(message: &str, conversation_length: usize, reason: &FallbackReason) -> Value {
    let reply = fallback_reply(message);
    json!({
        "response": reply,
        "analysis": heuristic_analysis(reply),
        "metadata": {
            "timestamp": Utc::now(),
            "model": FALLBACK_MODEL,
            "tokens_used": 0,
            "conversation_length": conversation_length,
            "fallback_reason": reason.to_string(),
        }
    })
}

/// Produces the `response`, `analysis` and `metadata` fields of a chat reply.
pub async fn respond(llm: &dyn ChatModel, message: &str, request: &ChatRequest) -> Value {
    let conversation_length = request.history.len() + 2;
    let context = request.context.clone().unwrap_or_else(|| json!({}));

    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(ChatMessage::system(prompts::chat_system(&context)));
    for entry in &request.history {
        messages.push(if entry.kind == "user" {
            ChatMessage::user(entry.content.clone())
        } else {
            ChatMessage::assistant(entry.content.clone())
        });
    }
    messages.push(ChatMessage::user(message));

    let options = ChatOptions {
        temperature: 0.7,
        max_tokens: 1500,
    };
    let reply = match gateway::complete_text(llm, &messages, options).await {
        Ok(reply) => reply,
        Err(reason) => return fallback(message, conversation_length, &reason),
    };

    let analysis = classify_reply(llm, message, &reply.text).await;
    json!({
        "response": reply.text,
        "analysis": analysis,
        "metadata": {
            "timestamp": Utc::now(),
            "model": reply.model,
            "tokens_used": reply.tokens_used,
            "conversation_length": conversation_length,
        }
    })
}
