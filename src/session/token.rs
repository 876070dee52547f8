use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::types::{TokenClaims, TokenType};

/// Errors produced by token verification and issuance
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Unexpected token type")]
    TypeMismatch,

    #[error("Failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Signs and verifies access and refresh tokens.
///
/// Each token type has its own signing secret, so compromise of one secret
/// cannot forge tokens of the other type. Pure apart from the clock read:
/// no I/O, no stored state.
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenCodec {
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: KeyPair::from_secret(access_secret),
            refresh: KeyPair::from_secret(refresh_secret),
        }
    }

    fn keys(&self, token_type: TokenType) -> &KeyPair {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    /// Issues a signed token for `subject` expiring `ttl` from now.
    /// Expiry is encoded as an absolute timestamp.
    pub fn issue(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        debug!(
            subject = %claims.sub,
            token_type = ?token_type,
            exp = claims.exp,
            "Issuing token"
        );

        encode(&Header::default(), &claims, &self.keys(token_type).encoding)
            .map_err(TokenError::Encoding)
    }

    /// Verifies signature, expiry and type discriminator, in that order.
    /// An authentic token past its expiry always reports `Expired`, never
    /// `InvalidSignature`.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            decode::<TokenClaims>(token, &self.keys(expected).decoding, &validation).map_err(
                |e| match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::InvalidSignature,
                },
            )?;

        if token_data.claims.token_type != expected {
            return Err(TokenError::TypeMismatch);
        }

        Ok(token_data.claims)
    }
}
