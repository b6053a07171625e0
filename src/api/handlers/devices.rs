//! Device resources: readings ingest and status queries.
//!
//! All three resources require a live session; the dispatcher has already
//! validated the token before these run.

use serde_json::{json, Value};

use crate::api::{
    dispatch::{PARAM_DEVICE_ID, PARAM_READING, PARAM_READING_TIME},
    error::ApiError,
    params::Params,
    state::AppState,
    validate, ApiResponse,
};
use crate::storage::Store;

pub(crate) fn device_id<'a>(params: &'a Params) -> Result<&'a str, ApiError> {
    let device_id = params.str(PARAM_DEVICE_ID)?;
    if !validate::is_uuid(device_id) {
        return Err(ApiError::MalformedRequest(
            "device_id is invalid".to_string(),
        ));
    }
    Ok(device_id)
}

/// GET `device_status`: all readings for one device as
/// `[reading, reading_time]` pairs.
pub(crate) async fn device_status(
    state: &AppState,
    params: &Params,
) -> Result<ApiResponse, ApiError> {
    let device_id = device_id(params)?;

    let readings = state
        .store()
        .retrieve_readings(device_id)
        .await
        .map_err(ApiError::Persistence)?;

    let pairs = readings
        .iter()
        .map(|r| json!([r.reading, r.reading_time]))
        .collect();
    Ok(ApiResponse::Json(Value::Array(pairs)))
}

/// POST `register_device`: acknowledge a device once its session checks out.
pub(crate) async fn register_device(
    _state: &AppState,
    _params: &Params,
) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::Empty)
}

/// POST `update_device_status`: append one reading.
pub(crate) async fn update_device_status(
    state: &AppState,
    params: &Params,
) -> Result<ApiResponse, ApiError> {
    let device_id = device_id(params)?;
    let reading = params.f64(PARAM_READING)?;
    let reading_time = params.i64(PARAM_READING_TIME)?;

    state
        .store()
        .create_reading(device_id, reading, reading_time)
        .await
        .map_err(ApiError::Persistence)?;
    Ok(ApiResponse::Empty)
}
