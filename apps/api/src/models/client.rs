use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Hot,
    Warm,
    Cold,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Hot => "hot",
            ClientStatus::Warm => "warm",
            ClientStatus::Cold => "cold",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub company: String,
    pub industry: String,
    pub location: String,
    pub revenue: String,
    pub employees: String,
    pub description: String,
    pub contact_info: ContactInfo,
    pub score: u8,
    pub status: ClientStatus,
    pub last_contact: String,
    pub deal_potential: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn has_email(&self, email: &str) -> bool {
        self.contact_info.email.eq_ignore_ascii_case(email.trim())
    }
}
