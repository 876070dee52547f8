use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::store::RefreshTokenStore;
use super::token::{TokenCodec, TokenError};
use super::types::{IssuedTokens, LoginRequest, SignupRequest, TokenClaims, TokenType};
use crate::shared::AppError;
use crate::user::{UserProfile, UserRepository};

/// Orchestrates signup, login, logout and refresh over the user repository,
/// token codec and revocation store. Holds no mutable state of its own: a
/// user is "active" exactly when the store has an unexpired refresh token
/// for them.
pub struct SessionService {
    users: Arc<dyn UserRepository + Send + Sync>,
    store: Arc<dyn RefreshTokenStore + Send + Sync>,
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        store: Arc<dyn RefreshTokenStore + Send + Sync>,
        codec: TokenCodec,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            users,
            store,
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Registers a new user and opens a session for them
    #[instrument(skip(self, request))]
    pub async fn signup(
        &self,
        request: SignupRequest,
    ) -> Result<(UserProfile, IssuedTokens), AppError> {
        validate_signup(&request)?;

        let user = self
            .users
            .create(request.name.trim(), &request.email, &request.password)
            .await?;

        info!(user_id = %user.id, "User created");

        let tokens = self.open_session(&user.id).await?;
        Ok((UserProfile::from(&user), tokens))
    }

    /// Verifies credentials and opens a session, superseding any previous
    /// one: the stored refresh token is overwritten, so only one session per
    /// user is ever active.
    #[instrument(skip(self, request))]
    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> Result<(UserProfile, IssuedTokens), AppError> {
        // Unknown email and wrong password take the same exit so responses
        // cannot be used to probe which emails are registered
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.verify_password(&request.password) {
            warn!(user_id = %user.id, "Password verification failed");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");

        let tokens = self.open_session(&user.id).await?;
        Ok((UserProfile::from(&user), tokens))
    }

    /// Ends the session named by the refresh cookie.
    ///
    /// Verification and store failures are logged and deliberately
    /// discarded: the caller clears the client's cookies either way, and a
    /// broken token must not keep a client logged in.
    #[instrument(skip(self, access_token, refresh_token))]
    pub async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        if access_token.is_none() && refresh_token.is_none() {
            return Err(AppError::AlreadyLoggedOut);
        }

        if let Some(token) = refresh_token {
            match self.codec.verify(token, TokenType::Refresh) {
                Ok(claims) => {
                    if let Err(e) = self.store.delete(&claims.sub).await {
                        warn!(user_id = %claims.sub, error = %e, "Failed to delete refresh token during logout");
                    } else {
                        info!(user_id = %claims.sub, "Session revoked");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring unverifiable refresh token during logout");
                }
            }
        }

        Ok(())
    }

    /// Exchanges a valid, still-current refresh token for a brand-new
    /// access/refresh pair. Rotation is unconditional: the presented token
    /// is superseded the moment this succeeds, so a captured token is usable
    /// at most once, and its use by an attacker surfaces as a `Forbidden`
    /// failure on the legitimate client's next refresh.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<IssuedTokens, AppError> {
        let token = refresh_token.ok_or_else(|| {
            AppError::MissingToken("Refresh token missing. Please log in again.".to_string())
        })?;

        let claims = self
            .codec
            .verify(token, TokenType::Refresh)
            .map_err(|e| match e {
                TokenError::Expired => {
                    AppError::Expired("Refresh token expired. Please log in again.".to_string())
                }
                // An unverifiable token gets the same treatment as a revoked
                // one; there is nothing finer to tell the client
                _ => AppError::Forbidden("Invalid refresh token. Please login again".to_string()),
            })?;

        // Signature and expiry are fine; now the token must also be the
        // single currently-stored one. Store unavailability propagates as
        // its own error rather than masquerading as a revoked session.
        let stored = self.store.get(&claims.sub).await?;
        match stored {
            Some(current) if current == token => {}
            _ => {
                warn!(user_id = %claims.sub, "Refresh token superseded or revoked");
                return Err(AppError::Forbidden(
                    "Invalid refresh token. Please login again".to_string(),
                ));
            }
        }

        info!(user_id = %claims.sub, "Rotating refresh token");
        self.open_session(&claims.sub).await
    }

    /// Verifies an access token for the transport-layer authentication check
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AppError> {
        self.codec
            .verify(token, TokenType::Access)
            .map_err(|e| match e {
                TokenError::Expired => AppError::Expired("Access token expired".to_string()),
                _ => AppError::Unauthorized("Invalid access token".to_string()),
            })
    }

    /// Returns the public profile for an already-authenticated user id
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(UserProfile::from(&user))
    }

    /// Issues a fresh access/refresh pair and makes the refresh token the
    /// user's single stored one
    async fn open_session(&self, user_id: &str) -> Result<IssuedTokens, AppError> {
        let access_token = self
            .codec
            .issue(user_id, TokenType::Access, self.access_ttl)
            .map_err(|e| {
                error!(error = %e, "Failed to issue access token");
                AppError::Internal
            })?;

        let refresh_token = self
            .codec
            .issue(user_id, TokenType::Refresh, self.refresh_ttl)
            .map_err(|e| {
                error!(error = %e, "Failed to issue refresh token");
                AppError::Internal
            })?;

        self.store
            .put(user_id, &refresh_token, self.refresh_ttl)
            .await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }
}

fn validate_signup(request: &SignupRequest) -> Result<(), AppError> {
    if request.name.trim().chars().count() < 3 {
        return Err(AppError::Validation(
            "Name should be minimum of length 3".to_string(),
        ));
    }
    if request.password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password should be minimum of length 6".to_string(),
        ));
    }
    if !is_well_formed_email(request.email.trim()) {
        return Err(AppError::Validation("Email is not valid".to_string()));
    }
    Ok(())
}

fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}
