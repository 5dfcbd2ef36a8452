use std::sync::Arc;

use crate::config::Config;
use crate::settings_store::SettingsStore;
use crate::store::StorageGateway;
use crate::tracker::{MemoryVisitStore, ViewTracker};
use crate::ws::manager::SubscriptionManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn StorageGateway>,
    pub config: Arc<Config>,
    pub events: SubscriptionManager,
    pub settings: SettingsStore,
    pub tracker: ViewTracker,
}

impl AppState {
    pub fn new(gateway: Arc<dyn StorageGateway>, config: Config) -> Self {
        let events = SubscriptionManager::new();
        let settings = SettingsStore::new(gateway.clone(), events.clone());
        let tracker = ViewTracker::new(
            gateway.clone(),
            Arc::new(MemoryVisitStore::new()),
            events.clone(),
        );
        Self {
            gateway,
            config: Arc::new(config),
            events,
            settings,
            tracker,
        }
    }
}
