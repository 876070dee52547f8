use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokengate::config::Config;
use tokengate::session::store::{InMemoryTokenStore, PostgresTokenStore, RefreshTokenStore};
use tokengate::session::{self, CookieConfig, SessionService, TokenCodec};
use tokengate::shared::AppState;
use tokengate::user::{InMemoryUserRepository, PostgresUserRepository, UserRepository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokengate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tokengate authentication service");

    let config = Config::from_env().expect("Invalid configuration");

    // Wire the storage backends: Postgres when configured, in-memory otherwise
    let (users, store): (
        Arc<dyn UserRepository + Send + Sync>,
        Arc<dyn RefreshTokenStore + Send + Sync>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .expect("Failed to connect to database");
            info!("Using Postgres-backed storage");
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresTokenStore::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set, using in-memory storage");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryTokenStore::new()),
            )
        }
    };

    let codec = TokenCodec::new(
        config.access_secret.as_bytes(),
        config.refresh_secret.as_bytes(),
    );
    let session_service = Arc::new(SessionService::new(
        users,
        store,
        codec,
        config.access_ttl(),
        config.refresh_ttl(),
    ));

    let cookies = CookieConfig {
        secure: config.secure_cookies,
        access_max_age: config.access_ttl_secs as i64,
        refresh_max_age: config.refresh_ttl_secs as i64,
    };
    let app_state = AppState::new(session_service, cookies);

    let app = Router::new()
        .nest("/api/auth", session::router(app_state))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!(addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await.unwrap();
}
