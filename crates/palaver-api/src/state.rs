use std::sync::Arc;
use std::time::Duration;

use palaver_db::ChatStore;

use crate::clock::Clock;
use crate::messages::MessageStore;
use crate::registry::Registry;
use crate::store::SharedStore;

/// Shared state for route handlers and the presence sweeper.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub messages: MessageStore,
}

impl AppState {
    pub fn new(store: Arc<dyn ChatStore>, clock: Arc<dyn Clock>, store_timeout: Duration) -> Self {
        let store = SharedStore::new(store, store_timeout);
        let messages = MessageStore::new(store.clone(), clock.clone());
        let registry = Registry::new(store, clock, messages.clone());
        Self { registry, messages }
    }
}
