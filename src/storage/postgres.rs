//! PostgreSQL store backed by a sqlx connection pool.

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;
use tracing::Instrument;

use super::{Reading, SessionRecord, Store, StoreError, UserRecord};

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        realname TEXT NOT NULL,
        hash TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        expiry BIGINT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS readings (
        device_id TEXT NOT NULL,
        reading DOUBLE PRECISION NOT NULL,
        reading_time BIGINT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS readings_device_idx ON readings (device_id)",
];

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be established within `timeout`
    /// or schema creation fails.
    pub async fn connect(dsn: &str, timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .acquire_timeout(timeout)
            .test_before_acquire(true)
            .connect(dsn)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(
        &self,
        username: &str,
        realname: &str,
        hash: &str,
    ) -> Result<(), StoreError> {
        let query = "INSERT INTO users (username, realname, hash) VALUES ($1, $2, $3)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(username)
            .bind(realname)
            .bind(hash)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn retrieve_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = "SELECT username, realname, hash FROM users WHERE username = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| UserRecord {
            username: row.get("username"),
            realname: row.get("realname"),
            hash: row.get("hash"),
        }))
    }

    async fn create_session_token(
        &self,
        token: &str,
        username: &str,
        expiry: i64,
    ) -> Result<(), StoreError> {
        let query = "INSERT INTO sessions (token, username, expiry) VALUES ($1, $2, $3)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token)
            .bind(username)
            .bind(expiry)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn retrieve_session_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let query = "SELECT username, expiry FROM sessions WHERE token = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| SessionRecord {
            username: row.get("username"),
            expiry: row.get("expiry"),
        }))
    }

    async fn delete_session_token(&self, token: &str) -> Result<(), StoreError> {
        // Idempotent; zero rows deleted is fine.
        let query = "DELETE FROM sessions WHERE token = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn create_reading(
        &self,
        device_id: &str,
        reading: f64,
        reading_time: i64,
    ) -> Result<(), StoreError> {
        let query = "INSERT INTO readings (device_id, reading, reading_time) VALUES ($1, $2, $3)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(device_id)
            .bind(reading)
            .bind(reading_time)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn retrieve_readings(&self, device_id: &str) -> Result<Vec<Reading>, StoreError> {
        let query = r"
            SELECT reading, reading_time
            FROM readings
            WHERE device_id = $1
            ORDER BY reading_time
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(device_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Reading {
                reading: row.get("reading"),
                reading_time: row.get("reading_time"),
            })
            .collect())
    }
}
