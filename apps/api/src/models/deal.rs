use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::models::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Closed,
    Lost,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "lead",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::Closed => "closed",
            DealStage::Lost => "lost",
        }
    }

    /// Closed and lost deals no longer count towards the pipeline.
    pub fn is_active(&self) -> bool {
        !matches!(self, DealStage::Closed | DealStage::Lost)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub name: String,
    pub company: String,
    pub value: f64,
    pub stage: DealStage,
    pub probability: u8,
    pub expected_close: Option<NaiveDate>,
    pub last_activity: String,
    pub assigned_to: String,
    pub priority: Level,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reads a close date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp.
/// Timestamps keep the calendar date in their own offset.
pub fn parse_close_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// `deserialize_with` adapter for optional close dates; `null` reads as absent.
pub fn deserialize_close_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_close_date(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid expectedClose date: {s}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_close_date_accepts_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 30);
        assert_eq!(parse_close_date("2024-06-30"), expected);
        assert_eq!(parse_close_date("2024-06-30T00:00:00.000Z"), expected);
        assert_eq!(parse_close_date("2024-06-30T23:30:00+02:00"), expected);
        assert_eq!(parse_close_date("30/06/2024"), None);
    }
}
