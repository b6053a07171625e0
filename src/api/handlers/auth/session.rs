//! Session token lifecycle: creation, validation, lazy expiry, revocation.
//!
//! Tokens are UUID v4 with an absolute expiry; validation never extends a
//! session. There is no background sweep: an expired record is deleted the
//! first time something tries to validate it.

use std::time::SystemTime;
use uuid::Uuid;

use crate::storage::{Store, StoreError};

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expiry: i64,
}

/// Unix seconds now.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Issue a new session token for `username`.
///
/// # Errors
///
/// Fails when the store cannot persist the record; the caller must surface
/// that as an authentication failure, not a partial success.
pub async fn create_session(
    store: &dyn Store,
    username: &str,
    ttl_seconds: i64,
) -> Result<Session, StoreError> {
    let token = Uuid::new_v4().to_string();
    let expiry = unix_now().saturating_add(ttl_seconds);
    store.create_session_token(&token, username, expiry).await?;
    Ok(Session { token, expiry })
}

/// Is the token live right now?
///
/// # Errors
///
/// Fails only on store errors; unknown tokens are `Ok(false)`.
pub async fn validate_session(store: &dyn Store, token: &str) -> Result<bool, StoreError> {
    validate_session_at(store, token, unix_now()).await
}

/// Validation against an explicit clock, used directly by tests.
pub async fn validate_session_at(
    store: &dyn Store,
    token: &str,
    now: i64,
) -> Result<bool, StoreError> {
    let Some(record) = store.retrieve_session_token(token).await? else {
        return Ok(false);
    };

    if now < record.expiry {
        return Ok(true);
    }

    // Token is expired, so delete it.
    store.delete_session_token(token).await?;
    Ok(false)
}

/// Revoke a session. Idempotent: revoking an unknown token succeeds.
///
/// # Errors
///
/// Fails only on store errors.
pub async fn delete_session(store: &dyn Store, token: &str) -> Result<(), StoreError> {
    store.delete_session_token(token).await
}
