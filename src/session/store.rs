use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::shared::AppError;

/// Key-value store holding the single currently-valid refresh token per
/// user. Any refresh token that does not match the stored value is rejected
/// even when its signature and expiry check out.
///
/// `put` fully replaces the previous entry (last-writer-wins under
/// concurrent refreshes) and `delete` is idempotent. All failures surface as
/// `AppError::StoreUnavailable` so callers never mistake an unreachable
/// store for a revoked session.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn put(&self, user_id: &str, token: &str, ttl: Duration) -> Result<(), AppError>;

    async fn get(&self, user_id: &str) -> Result<Option<String>, AppError>;

    async fn delete(&self, user_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
struct StoredToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// In-memory implementation of RefreshTokenStore for development and
/// testing. Entries past their TTL behave as absent and are evicted on
/// access.
pub struct InMemoryTokenStore {
    entries: Mutex<HashMap<String, StoredToken>>,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryTokenStore {
    #[instrument(skip(self, token))]
    async fn put(&self, user_id: &str, token: &str, ttl: Duration) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            user_id.to_string(),
            StoredToken {
                token: token.to_string(),
                expires_at: Utc::now() + ttl,
            },
        );

        debug!(user_id = %user_id, "Stored refresh token in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(user_id) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(Some(entry.token.clone())),
            Some(_) => {
                debug!(user_id = %user_id, "Stored refresh token expired, evicting");
                entries.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(user_id);

        debug!(user_id = %user_id, "Deleted refresh token from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of RefreshTokenStore.
///
/// Expects:
/// `refresh_tokens (user_id TEXT PRIMARY KEY, token TEXT NOT NULL,
///  expires_at TIMESTAMPTZ NOT NULL)`
///
/// Every operation is a single keyed statement, and the upsert replaces the
/// previous row atomically.
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresTokenStore {
    #[instrument(skip(self, token))]
    async fn put(&self, user_id: &str, token: &str, ttl: Duration) -> Result<(), AppError> {
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE \
             SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to store refresh token");
            AppError::StoreUnavailable(e.to_string())
        })?;

        debug!(user_id = %user_id, "Stored refresh token in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<String>, AppError> {
        // Expired rows behave as absent; the overwriting put keeps the table
        // bounded at one row per user
        let token: Option<String> = sqlx::query_scalar(
            "SELECT token FROM refresh_tokens WHERE user_id = $1 AND expires_at > $2",
        )
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch refresh token");
            AppError::StoreUnavailable(e.to_string())
        })?;

        Ok(token)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to delete refresh token");
                AppError::StoreUnavailable(e.to_string())
            })?;

        debug!(user_id = %user_id, "Deleted refresh token from database");
        Ok(())
    }
}
