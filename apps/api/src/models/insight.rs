use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Opportunity,
    Risk,
    Trend,
    Recommendation,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Opportunity => "opportunity",
            InsightKind::Risk => "risk",
            InsightKind::Trend => "trend",
            InsightKind::Recommendation => "recommendation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub impact: Level,
    pub confidence: u8,
    pub deal_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}
