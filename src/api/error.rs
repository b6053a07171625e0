//! Typed failure channel for the API dispatcher.
//!
//! Errors are raised at the point of detection and translated to a status
//! code exactly once, here. Internal detail (driver errors, stack context)
//! is logged server-side and never reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid-shape parameter, or an unhandled (verb, resource).
    #[error("{0}")]
    MalformedRequest(String),
    /// Bad credentials or an invalid/expired/unknown session token.
    #[error("{0}")]
    AuthenticationFailure(String),
    /// Declared for the dispatch contract; no current resource raises it.
    #[error("not logged in")]
    NotLoggedIn,
    /// Store unreachable or a write failed.
    #[error("persistence failure")]
    Persistence(#[source] StoreError),
    /// Programming error or unexpected failure.
    #[error("internal error")]
    Unhandled(#[source] anyhow::Error),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            Self::NotLoggedIn => StatusCode::FORBIDDEN,
            Self::Persistence(_) | Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller; 500s get a generic one.
    fn client_message(&self) -> String {
        match self {
            Self::MalformedRequest(msg) | Self::AuthenticationFailure(msg) => msg.clone(),
            Self::NotLoggedIn => "not logged in".to_string(),
            Self::Persistence(_) | Self::Unhandled(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Persistence(err) => error!("persistence failure: {err:?}"),
            Self::Unhandled(err) => error!("unhandled error: {err:?}"),
            Self::MalformedRequest(msg) => debug!("malformed request: {msg}"),
            Self::AuthenticationFailure(msg) => debug!("authentication failure: {msg}"),
            Self::NotLoggedIn => debug!("not logged in"),
        }

        let status = self.status();
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}
