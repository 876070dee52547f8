use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use super::password;
use crate::shared::AppError;

/// Trait for user persistence. Owns credential storage: `create` hashes the
/// plaintext password before it is stored, and emails are normalized to
/// lower case on every write and lookup.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user with a hashed password.
    /// Fails with `AppError::Conflict` if the email is already registered.
    async fn create(&self, name: &str, email: &str, password: &str)
        -> Result<UserModel, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserModel>, AppError>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>, // keyed by user id
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, password))]
    async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserModel, AppError> {
        let email = normalize_email(email);
        let password_hash = password::hash(password)?;

        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            warn!(email = %email, "Email already registered");
            return Err(AppError::Conflict(
                "User already present with these credentials".to_string(),
            ));
        }

        let user = UserModel::new(name.to_string(), email, password_hash);
        users.insert(user.id.clone(), user.clone());

        debug!(user_id = %user.id, "User created in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let email = normalize_email(email);
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(id).cloned())
    }
}

/// PostgreSQL implementation of UserRepository.
///
/// Expects:
/// `users (id TEXT PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL UNIQUE,
///  password_hash TEXT NOT NULL, created_at TIMESTAMPTZ NOT NULL)`
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, password))]
    async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserModel, AppError> {
        let email = normalize_email(email);
        let password_hash = password::hash(password)?;
        let user = UserModel::new(name.to_string(), email, password_hash);

        // ON CONFLICT DO NOTHING keeps the duplicate check and the insert in
        // one statement, so concurrent signups with the same email cannot
        // both succeed.
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (email) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::Database(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(email = %user.email, "Email already registered");
            return Err(AppError::Conflict(
                "User already present with these credentials".to_string(),
            ));
        }

        debug!(user_id = %user.id, "User created in database");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let email = normalize_email(email);

        sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by id");
            AppError::Database(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();

        let user = repo.create("Ann", "a@x.com", "secret1").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password_hash, "secret1");

        let by_email = repo.find_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);

        let by_id = repo.find_by_id(&user.id).await.unwrap();
        assert_eq!(by_id.unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();

        repo.create("Ann", "a@x.com", "secret1").await.unwrap();
        let result = repo.create("Ann Again", "a@x.com", "secret2").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_email_is_case_normalized() {
        let repo = InMemoryUserRepository::new();

        repo.create("Ann", "Ann@X.Com", "secret1").await.unwrap();

        // Duplicate detection and lookup both ignore case
        let result = repo.create("Ann", "ann@x.com", "secret1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let found = repo.find_by_email("ANN@x.com").await.unwrap();
        assert_eq!(found.unwrap().email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_find_unknown_user() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.find_by_email("nobody@x.com").await.unwrap().is_none());
        assert!(repo.find_by_id("missing-id").await.unwrap().is_none());
    }
}
