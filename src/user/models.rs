use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::password;

/// Database model for the users table.
///
/// Deliberately not serializable: the password hash must never reach a
/// response body. Handlers expose [`UserProfile`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: String, // UUID v4 as string
    pub name: String,
    pub email: String, // stored lower-cased
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user model with a generated ID and creation timestamp.
    /// `password_hash` must already be an Argon2id PHC string.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Checks a candidate password against the stored hash
    pub fn verify_password(&self, candidate: &str) -> bool {
        password::verify(candidate, &self.password_hash)
    }
}

/// Public view of a user, safe to serialize into response bodies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&UserModel> for UserProfile {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
