//! Login, registration and session resources.

use tracing::error;

use crate::api::{
    dispatch::{
        PARAM_PASSWORD, PARAM_PASSWORD1, PARAM_PASSWORD2, PARAM_REALNAME, PARAM_SESSION_TOKEN,
        PARAM_USERNAME,
    },
    error::ApiError,
    params::Params,
    state::AppState,
    validate, ApiResponse,
};
use crate::storage::{Store, StoreError};

pub mod password;
pub mod session;
pub mod types;

use password::PasswordError;
use types::SessionInfo;

/// Extract and shape-check the session token parameter.
///
/// A token that is not a UUID can never belong to a live session, so the
/// failure is an authentication failure, not a malformed request.
pub(crate) fn session_token<'a>(params: &'a Params) -> Result<&'a str, ApiError> {
    let token = params.str(PARAM_SESSION_TOKEN)?;
    if !validate::is_uuid(token) {
        return Err(ApiError::AuthenticationFailure(
            "session token is invalid".to_string(),
        ));
    }
    Ok(token)
}

/// POST `login`: verify credentials, then issue a session.
pub(crate) async fn login(state: &AppState, params: &Params) -> Result<ApiResponse, ApiError> {
    let username = params.str(PARAM_USERNAME)?;
    if !validate::is_email_address(username) {
        return Err(ApiError::AuthenticationFailure(
            "invalid email address".to_string(),
        ));
    }
    let password = params.str(PARAM_PASSWORD)?;

    // Unknown user and bad password are indistinguishable from the outside.
    if !authenticate_user(state, username, password).await? {
        return Err(ApiError::AuthenticationFailure(
            "authentication failed".to_string(),
        ));
    }

    issue_session(state, username).await
}

async fn authenticate_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<bool, ApiError> {
    if password.chars().count() < password::MIN_PASSWORD_LEN {
        return Ok(false);
    }

    let Some(user) = state
        .store()
        .retrieve_user(username)
        .await
        .map_err(ApiError::Persistence)?
    else {
        return Ok(false);
    };

    Ok(password::verify_password(password, &user.hash))
}

/// POST `create_login`: register a new user and log them straight in.
pub(crate) async fn create_login(
    state: &AppState,
    params: &Params,
) -> Result<ApiResponse, ApiError> {
    let username = params.str(PARAM_USERNAME)?;
    if !validate::is_email_address(username) {
        return Err(ApiError::MalformedRequest(
            "invalid email address".to_string(),
        ));
    }
    let realname = params.str(PARAM_REALNAME)?;
    if !validate::is_valid_decoded_str(realname) {
        return Err(ApiError::MalformedRequest("invalid name".to_string()));
    }
    let password1 = params.str(PARAM_PASSWORD1)?;
    let password2 = params.str(PARAM_PASSWORD2)?;
    if password1 != password2 {
        return Err(ApiError::MalformedRequest(
            "the passwords do not match".to_string(),
        ));
    }

    let hash = password::hash_password(password1).map_err(|err| match err {
        PasswordError::WeakInput => {
            ApiError::MalformedRequest("the password is too short".to_string())
        }
        PasswordError::Hash => ApiError::Unhandled(anyhow::anyhow!("password hashing failed")),
    })?;

    // The store's uniqueness constraint is the authority on duplicates, so
    // two concurrent registrations cannot both succeed.
    match state.store().create_user(username, realname, &hash).await {
        Ok(()) => {}
        Err(StoreError::Conflict) => {
            return Err(ApiError::MalformedRequest(
                "the user already exists".to_string(),
            ));
        }
        Err(err) => return Err(ApiError::Persistence(err)),
    }

    // The new user starts in a logged-in state.
    issue_session(state, username).await
}

/// Login succeeded but no session means no partial success: the caller sees
/// an authentication failure and the store error stays server-side.
async fn issue_session(state: &AppState, username: &str) -> Result<ApiResponse, ApiError> {
    match session::create_session(
        state.store(),
        username,
        state.config().session_ttl_seconds(),
    )
    .await
    {
        Ok(session) => ApiResponse::json(&SessionInfo {
            session_token: session.token,
            session_expiry: session.expiry,
        }),
        Err(err) => {
            error!("session issuance failed for {username}: {err:?}");
            Err(ApiError::AuthenticationFailure(
                "session token not generated".to_string(),
            ))
        }
    }
}

/// GET `login_status`: is the presented token a live session?
pub(crate) async fn login_status(
    state: &AppState,
    params: &Params,
) -> Result<ApiResponse, ApiError> {
    let token = session_token(params)?;
    if session::validate_session(state.store(), token)
        .await
        .map_err(ApiError::Persistence)?
    {
        Ok(ApiResponse::Empty)
    } else {
        Err(ApiError::AuthenticationFailure(
            "session is not valid".to_string(),
        ))
    }
}

/// POST `logout`: revoke the session. Succeeds whether or not it existed.
pub(crate) async fn logout(state: &AppState, params: &Params) -> Result<ApiResponse, ApiError> {
    let token = session_token(params)?;
    session::delete_session(state.store(), token)
        .await
        .map_err(ApiError::Persistence)?;
    Ok(ApiResponse::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::AppConfig;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), AppConfig::new())
    }

    fn registration(username: &str, password: &str) -> Params {
        Params::from_json(json!({
            "username": username,
            "realname": "Alice Example",
            "password1": password,
            "password2": password,
        }))
        .expect("object")
    }

    async fn register(state: &AppState, username: &str, password: &str) -> SessionInfo {
        let response = create_login(state, &registration(username, password))
            .await
            .expect("registration succeeds");
        match response {
            ApiResponse::Json(value) => serde_json::from_value(value).expect("session info"),
            ApiResponse::Empty => panic!("expected session info body"),
        }
    }

    #[tokio::test]
    async fn create_login_issues_session() {
        let state = test_state();
        let info = register(&state, "alice@example.com", "longpass1").await;
        assert!(validate::is_uuid(&info.session_token));
        assert!(
            session::validate_session(state.store(), &info.session_token)
                .await
                .expect("store works")
        );
    }

    #[tokio::test]
    async fn create_login_rejects_duplicates() {
        let state = test_state();
        register(&state, "alice@example.com", "longpass1").await;

        let err = create_login(&state, &registration("alice@example.com", "longpass1"))
            .await
            .expect_err("duplicate registration");
        match err {
            ApiError::MalformedRequest(msg) => assert_eq!(msg, "the user already exists"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_login_rejects_short_password() {
        let state = test_state();
        let err = create_login(&state, &registration("alice@example.com", "short"))
            .await
            .expect_err("short password");
        match err {
            ApiError::MalformedRequest(msg) => assert_eq!(msg, "the password is too short"),
            other => panic!("unexpected error: {other:?}"),
        }

        // No record was created for the failed registration
        assert!(state
            .store()
            .retrieve_user("alice@example.com")
            .await
            .expect("store works")
            .is_none());
    }

    #[tokio::test]
    async fn create_login_rejects_password_mismatch() {
        let state = test_state();
        let params = Params::from_json(json!({
            "username": "alice@example.com",
            "realname": "Alice Example",
            "password1": "longpass1",
            "password2": "longpass2",
        }))
        .expect("object");
        let err = create_login(&state, &params).await.expect_err("mismatch");
        assert!(matches!(err, ApiError::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn create_login_rejects_bad_realname() {
        let state = test_state();
        let params = Params::from_json(json!({
            "username": "alice@example.com",
            "realname": "still%20encoded",
            "password1": "longpass1",
            "password2": "longpass1",
        }))
        .expect("object");
        let err = create_login(&state, &params).await.expect_err("bad name");
        assert!(matches!(err, ApiError::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn login_conflates_unknown_user_and_bad_password() {
        let state = test_state();
        register(&state, "alice@example.com", "longpass1").await;

        let unknown = login(
            &state,
            &Params::from_json(json!({
                "username": "nobody@example.com",
                "password": "longpass1",
            }))
            .expect("object"),
        )
        .await
        .expect_err("unknown user");

        let wrong = login(
            &state,
            &Params::from_json(json!({
                "username": "alice@example.com",
                "password": "wrongpass1",
            }))
            .expect("object"),
        )
        .await
        .expect_err("wrong password");

        // Same externally observable failure either way
        match (unknown, wrong) {
            (ApiError::AuthenticationFailure(a), ApiError::AuthenticationFailure(b)) => {
                assert_eq!(a, b);
            }
            other => panic!("unexpected errors: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_accepts_valid_credentials() {
        let state = test_state();
        register(&state, "alice@example.com", "longpass1").await;

        let response = login(
            &state,
            &Params::from_json(json!({
                "username": "alice@example.com",
                "password": "longpass1",
            }))
            .expect("object"),
        )
        .await
        .expect("login succeeds");
        assert!(matches!(response, ApiResponse::Json(_)));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let state = test_state();
        let info = register(&state, "alice@example.com", "longpass1").await;
        let params = Params::from_json(json!({ "session_token": info.session_token }))
            .expect("object");

        assert!(logout(&state, &params).await.is_ok());
        assert!(logout(&state, &params).await.is_ok());

        let err = login_status(&state, &params)
            .await
            .expect_err("session gone");
        assert!(matches!(err, ApiError::AuthenticationFailure(_)));
    }

    #[tokio::test]
    async fn login_status_rejects_non_uuid_token() {
        let state = test_state();
        let params =
            Params::from_json(json!({ "session_token": "not-a-uuid" })).expect("object");
        let err = login_status(&state, &params).await.expect_err("bad token");
        assert!(matches!(err, ApiError::AuthenticationFailure(_)));
    }
}
