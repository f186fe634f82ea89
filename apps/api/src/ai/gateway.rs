//! Uniform live-or-fallback wrapper around the chat model.
//!
//! AI endpoints never fail because of the model: anything short of a JSON
//! object from a configured backend becomes a `Fallback` and the endpoint
//! serves its canned document instead.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm_client::{
    prompts::JSON_ONLY_SYSTEM, strip_json_fences, ChatMessage, ChatModel, ChatOptions, ChatReply,
};

pub const FALLBACK_MODEL: &str = "demo-fallback";

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    NotConfigured,
    Upstream(String),
    EmptyReply,
    MalformedJson(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotConfigured => write!(f, "AI service is not configured; serving demo content"),
            FallbackReason::Upstream(e) => write!(f, "AI service unavailable: {e}"),
            FallbackReason::EmptyReply => write!(f, "AI service returned an empty reply"),
            FallbackReason::MalformedJson(e) => write!(f, "AI reply was not valid JSON: {e}"),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Live {
        value: Document,
        tokens_used: u32,
        model: String,
    },
    Fallback(FallbackReason),
}

/// Which model produced a document, as reported in response metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStamp {
    pub model_used: String,
    pub tokens_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl ModelStamp {
    pub fn live(model: impl Into<String>, tokens_used: u32) -> Self {
        Self {
            model_used: model.into(),
            tokens_used,
            fallback_reason: None,
        }
    }

    pub fn fallback(reason: &FallbackReason) -> Self {
        Self {
            model_used: FALLBACK_MODEL.to_string(),
            tokens_used: 0,
            fallback_reason: Some(reason.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    /// Adds `model_used`, `tokens_used` and, on fallback, `fallback_reason` to an
    /// endpoint's metadata object.
    pub fn stamp(&self, mut metadata: Value) -> Value {
        if let Value::Object(map) = &mut metadata {
            map.insert("model_used".to_string(), Value::from(self.model_used.clone()));
            map.insert("tokens_used".to_string(), Value::from(self.tokens_used));
            if let Some(reason) = &self.fallback_reason {
                map.insert("fallback_reason".to_string(), Value::from(reason.clone()));
            }
        }
        metadata
    }
}

impl Outcome {
    /// The live document, or `fallback()` stamped as demo content.
    pub fn or_fallback(self, fallback: impl FnOnce() -> Document) -> (Document, ModelStamp) {
        match self {
            Outcome::Live {
                value,
                tokens_used,
                model,
            } => (value, ModelStamp::live(model, tokens_used)),
            Outcome::Fallback(reason) => (fallback(), ModelStamp::fallback(&reason)),
        }
    }
}

pub struct CompletionRequest {
    pub system: &'static str,
    pub prompt: String,
    pub options: ChatOptions,
}

fn log_fallback(reason: &FallbackReason) {
    match reason {
        FallbackReason::NotConfigured => debug!("Serving fallback: {reason}"),
        _ => warn!("Serving fallback: {reason}"),
    }
}

/// Plain-text completion; the reply must be non-empty.
pub async fn complete_text(
    llm: &dyn ChatModel,
    messages: &[ChatMessage],
    options: ChatOptions,
) -> Result<ChatReply, FallbackReason> {
    let result = if !llm.is_configured() {
        Err(FallbackReason::NotConfigured)
    } else {
        match llm.chat(messages, options).await {
            Ok(reply) if reply.text.trim().is_empty() => Err(FallbackReason::EmptyReply),
            Ok(reply) => Ok(reply),
            Err(e) => Err(FallbackReason::Upstream(e.to_string())),
        }
    };
    if let Err(reason) = &result {
        log_fallback(reason);
    }
    result
}

/// Completion whose reply must be a JSON object.
pub async fn complete_json(llm: &dyn ChatModel, request: CompletionRequest) -> Outcome {
    let messages = [
        ChatMessage::system(format!("{} {}", request.system, JSON_ONLY_SYSTEM)),
        ChatMessage::user(request.prompt),
    ];
    let reply = match complete_text(llm, &messages, request.options).await {
        Ok(reply) => reply,
        Err(reason) => return Outcome::Fallback(reason),
    };
    match parse_object(&reply.text) {
        Ok(value) => Outcome::Live {
            value,
            tokens_used: reply.tokens_used,
            model: reply.model,
        },
        Err(reason) => {
            log_fallback(&reason);
            Outcome::Fallback(reason)
        }
    }
}

/// Parses a model reply as a JSON object, tolerating markdown code fences.
pub fn parse_object(text: &str) -> Result<Document, FallbackReason> {
    let body = strip_json_fences(text);
    if body.is_empty() {
        return Err(FallbackReason::EmptyReply);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FallbackReason::MalformedJson(
            "expected a JSON object".to_string(),
        )),
        Err(e) => Err(FallbackReason::MalformedJson(e.to_string())),
    }
}

/// Unwraps a `json!({...})` literal into its map.
pub fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmClient;
    use crate::config::Config;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "You are a test analyst.",
            prompt: "Return JSON".to_string(),
            options: ChatOptions::default(),
        }
    }

    #[test]
    fn test_parse_object_handles_fences() {
        let doc = parse_object("```json\n{\"score\": 7}\n```").unwrap();
        assert_eq!(doc["score"], 7);
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        assert!(matches!(
            parse_object("[1, 2]"),
            Err(FallbackReason::MalformedJson(_))
        ));
        assert!(matches!(
            parse_object("Sure! Here is my analysis."),
            Err(FallbackReason::MalformedJson(_))
        ));
        assert_eq!(parse_object("``````"), Err(FallbackReason::EmptyReply));
    }

    #[tokio::test]
    async fn test_live_outcome_carries_usage() {
        let model = ScriptedModel::new(&["{\"summary\": \"ok\"}"]);
        match complete_json(&model, request()).await {
            Outcome::Live {
                value,
                tokens_used,
                model,
            } => {
                assert_eq!(value["summary"], "ok");
                assert_eq!(tokens_used, 42);
                assert_eq!(model, "scripted");
            }
            Outcome::Fallback(reason) => panic!("unexpected fallback: {reason}"),
        }
        let seen = model.seen.lock();
        assert!(seen[0][0].content.contains("valid JSON object"));
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let model = ScriptedModel::new(&["not json at all"]);
        let (doc, stamp) = complete_json(&model, request())
            .await
            .or_fallback(|| into_document(json!({"demo": true})));
        assert_eq!(doc["demo"], true);
        assert!(stamp.is_fallback());
        assert_eq!(stamp.tokens_used, 0);
        assert_eq!(stamp.model_used, FALLBACK_MODEL);

        let meta = stamp.stamp(json!({"sector": "retail"}));
        assert_eq!(meta["sector"], "retail");
        assert_eq!(meta["model_used"], "demo-fallback");
        assert!(meta["fallback_reason"]
            .as_str()
            .unwrap()
            .starts_with("AI reply was not valid JSON"));
    }

    #[test]
    fn test_live_stamp_has_no_reason() {
        let meta = ModelStamp::live("gpt-4o", 12).stamp(json!({}));
        assert_eq!(meta["model_used"], "gpt-4o");
        assert_eq!(meta["tokens_used"], 12);
        assert!(meta.get("fallback_reason").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_backend_falls_back() {
        let client = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let outcome = complete_json(&client, request()).await;
        assert!(matches!(
            outcome,
            Outcome::Fallback(FallbackReason::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back() {
        let model = ScriptedModel::new(&[]);
        let outcome = complete_json(&model, request()).await;
        assert!(matches!(outcome, Outcome::Fallback(FallbackReason::Upstream(_))));
    }
}
