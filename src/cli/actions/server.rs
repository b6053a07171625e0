use crate::api;
use crate::api::state::AppConfig;
use crate::cli::actions::Action;
use anyhow::{anyhow, Result};
use url::Url;

const SECONDS_PER_DAY: i64 = 86_400;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            session_ttl_days,
            store_timeout_seconds,
        } => {
            // Reject unsupported engines before opening any sockets
            let url = Url::parse(&dsn)?;
            match url.scheme() {
                "postgres" | "postgresql" | "sqlite" | "memory" => {}
                other => return Err(anyhow!("unsupported database scheme: {other}")),
            }

            let config = AppConfig::new()
                .with_session_ttl_seconds(session_ttl_days.saturating_mul(SECONDS_PER_DAY))
                .with_store_timeout_seconds(store_timeout_seconds);

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_rejects_unknown_scheme() {
        let action = Action::Server {
            port: 5555,
            dsn: "mysql://localhost/kegmon".to_string(),
            session_ttl_days: 90,
            store_timeout_seconds: 5,
        };

        let result = handle(action).await;
        assert!(result.is_err());
    }
}
