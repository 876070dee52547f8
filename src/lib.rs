// Library crate for the tokengate authentication service
// This file exposes the public API for integration tests

pub mod config;
pub mod session;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use session::store::{InMemoryTokenStore, PostgresTokenStore, RefreshTokenStore};
pub use session::{CookieConfig, SessionService, TokenCodec};
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
