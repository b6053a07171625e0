//! Persistence interface and backing engines.
//!
//! Every component reads and writes through the [`Store`] trait; nothing is
//! cached in-process between requests, so the store is the single
//! serialization point for concurrent requests. Uniqueness of usernames and
//! session tokens is enforced here (primary keys), which is what makes
//! concurrent duplicate registration safe.

use anyhow::Context;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use url::Url;

pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use sqlite::SqliteStore;

/// A registered user and their credential hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub realname: String,
    pub hash: String,
}

/// A live or expired session; validity is decided by the session manager.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub username: String,
    pub expiry: i64,
}

/// One sensor reading, append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub reading: f64,
    pub reading_time: i64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (record already exists).
    #[error("record already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict
        } else {
            Self::Backend(err.into())
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.kind() == sqlx::error::ErrorKind::UniqueViolation
        }
        _ => false,
    }
}

/// Fixed method set every backing engine must provide.
///
/// Single-record creates, lookups and deletes are atomic in every backend;
/// callers never need locks of their own.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a user; fails with [`StoreError::Conflict`] if the username is taken.
    async fn create_user(
        &self,
        username: &str,
        realname: &str,
        hash: &str,
    ) -> Result<(), StoreError>;

    async fn retrieve_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Persist a session token; fails with [`StoreError::Conflict`] on token reuse.
    async fn create_session_token(
        &self,
        token: &str,
        username: &str,
        expiry: i64,
    ) -> Result<(), StoreError>;

    async fn retrieve_session_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StoreError>;

    /// Delete a session token; deleting an absent token is not an error.
    async fn delete_session_token(&self, token: &str) -> Result<(), StoreError>;

    async fn create_reading(
        &self,
        device_id: &str,
        reading: f64,
        reading_time: i64,
    ) -> Result<(), StoreError>;

    /// Readings for one device, ordered by reading time.
    async fn retrieve_readings(&self, device_id: &str) -> Result<Vec<Reading>, StoreError>;
}

/// Open the store named by the DSN scheme.
///
/// `postgres://` and `sqlite://` map to their sqlx engines; `memory://` is an
/// in-process store for tests and local development.
///
/// # Errors
///
/// Returns an error for unknown schemes or when the engine cannot be reached
/// within `timeout`.
pub async fn connect(dsn: &str, timeout: Duration) -> anyhow::Result<Arc<dyn Store>> {
    let url = Url::parse(dsn).with_context(|| format!("invalid DSN: {dsn}"))?;

    match url.scheme() {
        "postgres" | "postgresql" => Ok(Arc::new(PgStore::connect(dsn, timeout).await?)),
        "sqlite" => Ok(Arc::new(SqliteStore::connect(dsn, timeout).await?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => anyhow::bail!("unsupported database scheme: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_unknown_scheme() {
        let result = connect("mysql://localhost/kegmon", Duration::from_secs(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn connect_rejects_garbage_dsn() {
        let result = connect("not a dsn", Duration::from_secs(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn connect_memory_scheme() -> anyhow::Result<()> {
        let store = connect("memory://", Duration::from_secs(1)).await?;
        assert!(store.retrieve_user("nobody@example.com").await?.is_none());
        Ok(())
    }
}
