use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;
use crate::notifications::hub::NotificationHub;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// Chat backend. `LlmClient` in production; tests swap in a scripted model.
    pub llm: Arc<dyn ChatModel>,
    pub config: Config,
    pub hub: NotificationHub,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn ChatModel>) -> Self {
        Self {
            store: Arc::new(Store::seeded()),
            llm,
            config,
            hub: NotificationHub::default(),
        }
    }
}
