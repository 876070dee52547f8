use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    middleware,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use super::cookie::{get_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use super::middleware::access_auth;
use super::types::{IssuedTokens, LoginRequest, SignupRequest, TokenClaims};
use crate::shared::{AppError, AppState};

/// Builds the authentication router; mounted under /api/auth in main
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_auth));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
        .merge(protected)
        .with_state(state)
}

fn session_cookies(state: &AppState, tokens: &IssuedTokens) -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    AppendHeaders([
        (SET_COOKIE, state.cookies.access(&tokens.access_token)),
        (SET_COOKIE, state.cookies.refresh(&tokens.refresh_token)),
    ])
}

/// POST /signup
/// Registers a user and opens a session via secure cookies
#[instrument(name = "signup", skip(state, request))]
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state.session_service.signup(request).await?;

    info!(user_id = %user.id, "Signup completed");

    Ok((
        StatusCode::CREATED,
        session_cookies(&state, &tokens),
        Json(json!({
            "user": user,
            "message": "User created successfully"
        })),
    ))
}

/// POST /login
/// Verifies credentials and opens a session, superseding any previous one
#[instrument(name = "login", skip(state, request))]
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state.session_service.login(request).await?;

    info!(user_id = %user.id, "Login completed");

    Ok((
        StatusCode::OK,
        session_cookies(&state, &tokens),
        Json(json!({
            "user": user,
            "message": "User loggedIn successfully"
        })),
    ))
}

/// POST /logout
/// Revokes the stored refresh token (best effort) and clears both cookies
#[instrument(name = "logout", skip(state, headers))]
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let access = get_cookie(&headers, ACCESS_COOKIE_NAME);
    let refresh = get_cookie(&headers, REFRESH_COOKIE_NAME);

    state.session_service.logout(access, refresh).await?;

    // Cookies are cleared regardless of whether the tokens verified
    Ok((
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, state.cookies.clear_access()),
            (SET_COOKIE, state.cookies.clear_refresh()),
        ]),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

/// POST /refresh-token
/// Rotates the refresh token and issues a new access token
#[instrument(name = "refresh_token", skip(state, headers))]
async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh = get_cookie(&headers, REFRESH_COOKIE_NAME);

    let tokens = state.session_service.refresh(refresh).await?;

    Ok((
        StatusCode::OK,
        session_cookies(&state, &tokens),
        Json(json!({ "message": "Tokens refreshed successfully" })),
    ))
}

/// GET /profile
/// Pure read of the identity attached by the access_auth middleware
#[instrument(name = "profile", skip(state, claims))]
async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.session_service.profile(&claims.sub).await?;

    Ok(Json(json!({ "user": user })))
}
