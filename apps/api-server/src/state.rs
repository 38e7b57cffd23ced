//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use blog_infra::auth::{Argon2PasswordService, JwtTokenService};
use blog_infra::database::{DatabaseConnections, InMemoryStore};

use crate::config::{AppConfig, PaginationConfig};

#[cfg(feature = "postgres")]
use blog_infra::database::{PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Build the state from configuration. A configured database that cannot
    /// be reached is a startup error.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Self::in_memory(tokens, passwords, config.pagination));
        };

        #[cfg(feature = "postgres")]
        {
            let connections = DatabaseConnections::init(db_config).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to database");
                std::io::Error::other(e)
            })?;
            let connections = Arc::new(connections);

            tracing::info!("Application state initialized (postgres)");
            Ok(Self {
                users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
                posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
                tokens,
                passwords,
                db: Some(connections),
                pagination: config.pagination,
            })
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = db_config;
            tracing::warn!(
                "Built without postgres feature - ignoring DATABASE_URL and using in-memory store"
            );
            Ok(Self::in_memory(tokens, passwords, config.pagination))
        }
    }

    /// State backed by a fresh [`InMemoryStore`].
    pub fn in_memory(
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        pagination: PaginationConfig,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store,
            tokens,
            passwords,
            db: None,
            pagination,
        }
    }

    /// Name of the storage backend, for health reporting.
    pub fn storage(&self) -> &'static str {
        if self.db.is_some() { "postgres" } else { "in-memory" }
    }
}
