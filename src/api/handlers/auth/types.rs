//! Response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by `login` and `create_login`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionInfo {
    pub session_token: String,
    pub session_expiry: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn session_info_round_trips() -> Result<()> {
        let info = SessionInfo {
            session_token: "3d1f0a36-0d34-4d3a-8ee5-0d5f0a67d001".to_string(),
            session_expiry: 1_700_000_000,
        };
        let value = serde_json::to_value(&info)?;
        let token = value
            .get("session_token")
            .and_then(serde_json::Value::as_str)
            .context("missing session_token")?;
        assert_eq!(token, "3d1f0a36-0d34-4d3a-8ee5-0d5f0a67d001");
        let decoded: SessionInfo = serde_json::from_value(value)?;
        assert_eq!(decoded.session_expiry, 1_700_000_000);
        Ok(())
    }
}
