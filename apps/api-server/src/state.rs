//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, Repositories, TokenService};
use quill_core::service::{AccountService, CommentPolicy, CommentService, LikeService, PostService};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub posts: PostService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub tokens: Arc<dyn TokenService>,
    /// Which store backs the repositories, for the health report.
    pub storage: &'static str,
}

impl AppState {
    /// Wire the services over a set of repositories.
    pub fn from_parts(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        policy: CommentPolicy,
        page_size: u64,
        storage: &'static str,
    ) -> Self {
        Self {
            accounts: AccountService::new(repos.users.clone(), passwords),
            posts: PostService::new(repos.clone()).with_page_size(page_size),
            comments: CommentService::new(repos.clone(), policy),
            likes: LikeService::new(repos),
            tokens,
            storage,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (repos, storage) = Self::repositories(config).await;

        tracing::info!(
            storage,
            auto_approve_direct = config.comments.auto_approve_on_direct_post_comment,
            auto_approve_collection = config.comments.auto_approve_on_collection_comment,
            "Application state initialized"
        );

        Self::from_parts(
            repos,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::new()),
            config.comments,
            config.page_size,
            storage,
        )
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> (Repositories, &'static str) {
        use migration::{Migrator, MigratorTrait};
        use quill_infra::{DatabaseConfig, DatabaseConnections};

        let Some(settings) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (InMemoryStore::new().repositories(), "memory");
        };

        let db_config = DatabaseConfig {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
        };

        let connections = match DatabaseConnections::init(&db_config).await {
            Ok(connections) => connections,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return (InMemoryStore::new().repositories(), "memory");
            }
        };

        if settings.auto_migrate {
            match Migrator::up(&connections.main, None).await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::error!(error = %e, "Failed to apply migrations"),
            }
        }

        (connections.repositories(), "postgres")
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(config: &AppConfig) -> (Repositories, &'static str) {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }
        tracing::info!("Using in-memory repositories");
        (InMemoryStore::new().repositories(), "memory")
    }
}
