// Public API - what other modules can use
pub use models::{UserModel, UserProfile};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};

// Internal modules
pub mod models;
mod password;
pub mod repository;
