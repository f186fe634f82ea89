use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub user_id: Option<String>,
    pub metadata: Option<Value>,
}

impl Notification {
    /// `None` scope means "every user".
    pub fn belongs_to(&self, user_id: Option<&str>) -> bool {
        match user_id {
            Some(u) => self.user_id.as_deref() == Some(u),
            None => true,
        }
    }
}
