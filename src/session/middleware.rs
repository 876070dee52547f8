use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{instrument, warn};

use super::cookie::{get_cookie, ACCESS_COOKIE_NAME};
use crate::shared::{AppError, AppState};

/// Access-token authentication middleware for protected routes.
/// Verifies the access cookie and adds TokenClaims to request extensions.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), session::access_auth))
#[instrument(skip(state, req, next))]
pub async fn access_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = get_cookie(req.headers(), ACCESS_COOKIE_NAME).ok_or_else(|| {
        warn!("Missing access token cookie");
        AppError::MissingToken("Access token missing".to_string())
    })?;

    let claims = match state.session_service.verify_access(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "Access token verification failed");
            return Err(e);
        }
    };

    // Make the authenticated identity available to handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
