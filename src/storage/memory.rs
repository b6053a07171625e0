//! In-process store used by the test suite and `memory://` DSNs.
//!
//! Each map mutation happens under one lock acquisition, so the
//! check-then-insert in [`MemoryStore::create_user`] is atomic just like a
//! unique index in the SQL engines.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{Reading, SessionRecord, Store, StoreError, UserRecord};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
    readings: Mutex<HashMap<String, Vec<Reading>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        realname: &str,
        hash: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if users.contains_key(username) {
            return Err(StoreError::Conflict);
        }
        users.insert(
            username.to_string(),
            UserRecord {
                username: username.to_string(),
                realname: realname.to_string(),
                hash: hash.to_string(),
            },
        );
        Ok(())
    }

    async fn retrieve_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().await.get(username).cloned())
    }

    async fn create_session_token(
        &self,
        token: &str,
        username: &str,
        expiry: i64,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(token) {
            return Err(StoreError::Conflict);
        }
        sessions.insert(
            token.to_string(),
            SessionRecord {
                username: username.to_string(),
                expiry,
            },
        );
        Ok(())
    }

    async fn retrieve_session_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.sessions.lock().await.get(token).cloned())
    }

    async fn delete_session_token(&self, token: &str) -> Result<(), StoreError> {
        self.sessions.lock().await.remove(token);
        Ok(())
    }

    async fn create_reading(
        &self,
        device_id: &str,
        reading: f64,
        reading_time: i64,
    ) -> Result<(), StoreError> {
        self.readings
            .lock()
            .await
            .entry(device_id.to_string())
            .or_default()
            .push(Reading {
                reading,
                reading_time,
            });
        Ok(())
    }

    async fn retrieve_readings(&self, device_id: &str) -> Result<Vec<Reading>, StoreError> {
        let mut readings = self
            .readings
            .lock()
            .await
            .get(device_id)
            .cloned()
            .unwrap_or_default();
        readings.sort_by_key(|r| r.reading_time);
        Ok(readings)
    }
}
