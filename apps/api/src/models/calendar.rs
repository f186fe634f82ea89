use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Deadline,
    Meeting,
    Milestone,
    Reminder,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Deadline => "deadline",
            EventKind::Meeting => "meeting",
            EventKind::Milestone => "milestone",
            EventKind::Reminder => "reminder",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub priority: Level,
    pub deal_id: Option<String>,
    pub deal_name: Option<String>,
    pub completed: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
