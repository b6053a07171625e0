//! Parameter bag handed to API handlers.
//!
//! GET and DELETE parameters come from the query string, POST parameters
//! from a JSON object body; both normalize into the same map so the
//! dispatcher can enforce one required-parameter contract.

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::error::ApiError;

#[derive(Debug, Default)]
pub struct Params(Map<String, Value>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let map = query
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        Self(map)
    }

    /// Accept a JSON object body; anything else is a malformed request.
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::MalformedRequest(
                "request body must be a JSON object".to_string(),
            )),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Check each required key in order; fail on the first missing one.
    pub fn require(&self, keys: &[&str]) -> Result<(), ApiError> {
        for key in keys {
            if !self.contains(key) {
                return Err(ApiError::MalformedRequest(format!("{key} not specified")));
            }
        }
        Ok(())
    }

    /// String value of a key; missing or non-string values are malformed.
    pub fn str(&self, key: &str) -> Result<&str, ApiError> {
        match self.0.get(key) {
            Some(Value::String(value)) => Ok(value),
            Some(_) => Err(ApiError::MalformedRequest(format!("{key} is invalid"))),
            None => Err(ApiError::MalformedRequest(format!("{key} not specified"))),
        }
    }

    /// Numeric value of a key; numeric strings are accepted for
    /// query-parameter callers.
    pub fn f64(&self, key: &str) -> Result<f64, ApiError> {
        match self.0.get(key) {
            Some(Value::Number(value)) => value
                .as_f64()
                .ok_or_else(|| ApiError::MalformedRequest(format!("{key} is invalid"))),
            Some(Value::String(value)) => value
                .parse()
                .map_err(|_| ApiError::MalformedRequest(format!("{key} is invalid"))),
            Some(_) => Err(ApiError::MalformedRequest(format!("{key} is invalid"))),
            None => Err(ApiError::MalformedRequest(format!("{key} not specified"))),
        }
    }

    /// Integer value of a key; numeric strings are accepted for
    /// query-parameter callers.
    pub fn i64(&self, key: &str) -> Result<i64, ApiError> {
        match self.0.get(key) {
            Some(Value::Number(value)) => value
                .as_i64()
                .ok_or_else(|| ApiError::MalformedRequest(format!("{key} is invalid"))),
            Some(Value::String(value)) => value
                .parse()
                .map_err(|_| ApiError::MalformedRequest(format!("{key} is invalid"))),
            Some(_) => Err(ApiError::MalformedRequest(format!("{key} is invalid"))),
            None => Err(ApiError::MalformedRequest(format!("{key} not specified"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_reports_first_missing_key() {
        let params = Params::from_json(json!({ "username": "a@b.com" })).expect("object");
        let err = params
            .require(&["username", "password1", "password2"])
            .expect_err("missing keys");
        match err {
            ApiError::MalformedRequest(msg) => assert_eq!(msg, "password1 not specified"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_passes_when_all_present() {
        let params =
            Params::from_json(json!({ "username": "a@b.com", "password": "p" })).expect("object");
        assert!(params.require(&["username", "password"]).is_ok());
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(Params::from_json(json!([1, 2, 3])).is_err());
        assert!(Params::from_json(json!("string")).is_err());
    }

    #[test]
    fn query_values_are_strings() {
        let mut query = HashMap::new();
        query.insert("session_token".to_string(), "abc".to_string());
        let params = Params::from_query(&query);
        assert_eq!(params.str("session_token").ok(), Some("abc"));
    }

    #[test]
    fn numeric_accessors_accept_strings_and_numbers() {
        let params = Params::from_json(json!({
            "reading": 12.5,
            "reading_time": "1700000000",
        }))
        .expect("object");
        assert_eq!(params.f64("reading").ok(), Some(12.5));
        assert_eq!(params.i64("reading_time").ok(), Some(1_700_000_000));
    }

    #[test]
    fn numeric_accessors_reject_garbage() {
        let params = Params::from_json(json!({ "reading": "not-a-number" })).expect("object");
        assert!(params.f64("reading").is_err());
        assert!(params.i64("reading").is_err());
    }

    #[test]
    fn str_rejects_non_string_values() {
        let params = Params::from_json(json!({ "username": 42 })).expect("object");
        assert!(params.str("username").is_err());
    }
}
