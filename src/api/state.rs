//! Request-scoped application state.
//!
//! Built once at startup and handed to every handler through an axum
//! `Extension`; there is no ambient global state.

use std::{sync::Arc, time::Duration};

use crate::storage::Store;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 90 * 86_400;
const DEFAULT_STORE_TIMEOUT_SECONDS: u64 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    session_ttl_seconds: i64,
    store_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            store_timeout_seconds: DEFAULT_STORE_TIMEOUT_SECONDS,
        }
    }

    #[must_use]
    pub const fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_store_timeout_seconds(mut self, seconds: u64) -> Self {
        self.store_timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }
}

pub struct AppState {
    store: Arc<dyn Store>,
    config: AppConfig,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn config_defaults_and_overrides() {
        let config = AppConfig::new();
        assert_eq!(config.session_ttl_seconds(), 90 * 86_400);
        assert_eq!(config.store_timeout(), Duration::from_secs(5));

        let config = config
            .with_session_ttl_seconds(3_600)
            .with_store_timeout_seconds(2);
        assert_eq!(config.session_ttl_seconds(), 3_600);
        assert_eq!(config.store_timeout(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn state_exposes_store_and_config() {
        let state = AppState::new(Arc::new(MemoryStore::new()), AppConfig::new());
        assert_eq!(state.config().session_ttl_seconds(), 90 * 86_400);
        assert!(state
            .store()
            .retrieve_user("nobody@example.com")
            .await
            .expect("memory store")
            .is_none());
    }
}
