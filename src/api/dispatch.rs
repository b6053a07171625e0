//! Verb + resource dispatch for the versioned API surface.
//!
//! Every call runs the same gauntlet: required-parameter presence (first
//! missing key wins), shape validation, session validation for protected
//! resources, then business logic. Unrecognized `(verb, resource)` pairs are
//! "not handled" rather than an error further in.

use axum::{
    extract::{Extension, Path, Query},
    http::Method,
    Json,
};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

use super::{
    error::ApiError,
    handlers::{auth, auth::session, devices},
    params::Params,
    state::AppState,
    ApiResponse,
};

// Constants used with the API
pub const PARAM_DEVICE_ID: &str = "device_id";
pub const PARAM_READING: &str = "reading";
pub const PARAM_READING_TIME: &str = "reading_time";
/// Login name for a user
pub const PARAM_USERNAME: &str = "username";
/// User's real name
pub const PARAM_REALNAME: &str = "realname";
/// User's password
pub const PARAM_PASSWORD: &str = "password";
/// User's password when creating an account
pub const PARAM_PASSWORD1: &str = "password1";
/// User's confirmation password when creating an account
pub const PARAM_PASSWORD2: &str = "password2";
pub const PARAM_SESSION_TOKEN: &str = "session_token";

const API_VERSION: &str = "1.0";

/// Resources the dispatcher maps to handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resource {
    Login,
    CreateLogin,
    LoginStatus,
    Logout,
    DeviceStatus,
    RegisterDevice,
    UpdateDeviceStatus,
}

impl Resource {
    /// Map `(verb, resource name)` to a handler; `None` is "not handled".
    /// DELETE is accepted by the dispatcher but no resource implements it.
    fn lookup(verb: &Method, name: &str) -> Option<Self> {
        if verb == Method::GET {
            match name {
                "login_status" => Some(Self::LoginStatus),
                "device_status" => Some(Self::DeviceStatus),
                _ => None,
            }
        } else if verb == Method::POST {
            match name {
                "login" => Some(Self::Login),
                "create_login" => Some(Self::CreateLogin),
                "logout" => Some(Self::Logout),
                "register_device" => Some(Self::RegisterDevice),
                "update_device_status" => Some(Self::UpdateDeviceStatus),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Required keys, in the order they are checked.
    const fn required(self) -> &'static [&'static str] {
        match self {
            Self::Login => &[PARAM_USERNAME, PARAM_PASSWORD],
            Self::CreateLogin => &[
                PARAM_USERNAME,
                PARAM_REALNAME,
                PARAM_PASSWORD1,
                PARAM_PASSWORD2,
            ],
            Self::LoginStatus | Self::Logout | Self::RegisterDevice => &[PARAM_SESSION_TOKEN],
            Self::DeviceStatus => &[PARAM_SESSION_TOKEN, PARAM_DEVICE_ID],
            Self::UpdateDeviceStatus => &[
                PARAM_SESSION_TOKEN,
                PARAM_DEVICE_ID,
                PARAM_READING,
                PARAM_READING_TIME,
            ],
        }
    }

    /// Whether the dispatcher validates the session before the handler runs.
    /// `login_status` and `logout` validate their own token instead.
    const fn requires_session(self) -> bool {
        match self {
            Self::Login | Self::CreateLogin | Self::LoginStatus | Self::Logout => false,
            Self::DeviceStatus | Self::RegisterDevice | Self::UpdateDeviceStatus => true,
        }
    }

    /// Shape checks that run before any session lookup. Login and
    /// registration classify their own identifier failures, so they have
    /// nothing to do here.
    fn check_shape(self, params: &Params) -> Result<(), ApiError> {
        match self {
            Self::Login | Self::CreateLogin => Ok(()),
            Self::LoginStatus | Self::Logout | Self::RegisterDevice => {
                auth::session_token(params).map(|_| ())
            }
            Self::DeviceStatus | Self::UpdateDeviceStatus => {
                auth::session_token(params)?;
                devices::device_id(params).map(|_| ())
            }
        }
    }

    async fn call(self, state: &AppState, params: &Params) -> Result<ApiResponse, ApiError> {
        match self {
            Self::Login => auth::login(state, params).await,
            Self::CreateLogin => auth::create_login(state, params).await,
            Self::LoginStatus => auth::login_status(state, params).await,
            Self::Logout => auth::logout(state, params).await,
            Self::DeviceStatus => devices::device_status(state, params).await,
            Self::RegisterDevice => devices::register_device(state, params).await,
            Self::UpdateDeviceStatus => devices::update_device_status(state, params).await,
        }
    }
}

pub(crate) async fn dispatch(
    state: &AppState,
    verb: &Method,
    resource: &str,
    params: &Params,
) -> Result<ApiResponse, ApiError> {
    let name = resource.to_lowercase();
    let Some(resource) = Resource::lookup(verb, &name) else {
        return Err(ApiError::MalformedRequest(format!(
            "unhandled request: {name}"
        )));
    };

    // (1) Required-parameter presence, first miss wins.
    params.require(resource.required())?;

    // (2) Shape validation.
    resource.check_shape(params)?;

    // (3) Protected resources validate the session before any business
    // logic can run.
    if resource.requires_session() {
        let token = params.str(PARAM_SESSION_TOKEN)?;
        if !session::validate_session(state.store(), token)
            .await
            .map_err(ApiError::Persistence)?
        {
            return Err(ApiError::AuthenticationFailure(
                "session is not valid".to_string(),
            ));
        }
    }

    // (4) Business logic.
    resource.call(state, params).await
}

fn ensure_version(version: &str) -> Result<(), ApiError> {
    if version == API_VERSION {
        Ok(())
    } else {
        Err(ApiError::MalformedRequest(format!(
            "unsupported API version: {version}"
        )))
    }
}

/// GET `/api/:version/:resource`; parameters come from the query string.
pub async fn api_get(
    Extension(state): Extension<Arc<AppState>>,
    Path((version, resource)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<ApiResponse, ApiError> {
    ensure_version(&version)?;
    dispatch(&state, &Method::GET, &resource, &Params::from_query(&query)).await
}

/// POST `/api/:version/:resource`; parameters come from a JSON object body.
pub async fn api_post(
    Extension(state): Extension<Arc<AppState>>,
    Path((version, resource)): Path<(String, String)>,
    payload: Option<Json<Value>>,
) -> Result<ApiResponse, ApiError> {
    ensure_version(&version)?;
    let params = match payload {
        Some(Json(value)) => Params::from_json(value)?,
        None => Params::new(),
    };
    dispatch(&state, &Method::POST, &resource, &params).await
}

/// DELETE `/api/:version/:resource`; accepted but never handled.
pub async fn api_delete(
    Extension(state): Extension<Arc<AppState>>,
    Path((version, resource)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<ApiResponse, ApiError> {
    ensure_version(&version)?;
    dispatch(
        &state,
        &Method::DELETE,
        &resource,
        &Params::from_query(&query),
    )
    .await
}
