// Public API - what other modules can use
pub use cookie::{get_cookie, CookieConfig, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
pub use handlers::router;
pub use middleware::access_auth;
pub use service::SessionService;
pub use token::{TokenCodec, TokenError};
pub use types::{IssuedTokens, LoginRequest, SignupRequest, TokenClaims, TokenType};

// Internal modules
pub mod cookie;
mod handlers;
mod middleware;
pub mod service;
pub mod store;
pub mod token;
pub mod types;
