use serde::{Deserialize, Serialize};

/// Discriminator baked into every token so one kind cannot be replayed as
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived, stateless; verified by signature and expiry only
    Access,
    /// Long-lived; additionally checked against the revocation store
    Refresh,
}

/// JWT claims carried by both token types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: String,
    /// Token id; makes every issued token distinct, so rotation always
    /// produces a new string even within the same clock second
    pub jti: String,
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp, absolute)
    pub exp: i64,
}

/// Request body for POST /signup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for POST /login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access/refresh pair produced by signup, login and refresh
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}
