//! In-memory record store shared by every handler through `Arc<Store>`.
//!
//! One lock per collection. Guards must be dropped before any `.await`.

mod seed;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::calendar::CalendarEvent;
use crate::models::client::Client;
use crate::models::deal::Deal;
use crate::models::insight::Insight;
use crate::models::notification::Notification;

/// Upper bound on retained notifications; oldest are dropped first.
pub const MAX_NOTIFICATIONS: usize = 1000;

#[derive(Default)]
pub struct Store {
    pub deals: RwLock<Vec<Deal>>,
    pub clients: RwLock<Vec<Client>>,
    pub insights: RwLock<Vec<Insight>>,
    /// Newest first.
    pub notifications: RwLock<Vec<Notification>>,
    pub events: RwLock<Vec<CalendarEvent>>,
}

impl Store {
    /// Store pre-populated with the demo dataset.
    pub fn seeded() -> Self {
        let now = chrono::Utc::now();
        Self {
            deals: RwLock::new(seed::deals(now)),
            clients: RwLock::new(seed::clients(now)),
            insights: RwLock::new(seed::insights(now)),
            notifications: RwLock::new(Vec::new()),
            events: RwLock::new(seed::events(now)),
        }
    }
}

/// Identifier for records created at runtime. Seeded records use short numeric ids.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
