//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_core::service::{CommentPolicy, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use quill_infra::JwtConfig;

/// Database settings. Absent `DATABASE_URL` means the in-memory store.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Apply pending migrations at startup.
    pub auto_migrate: bool,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub jwt: JwtConfig,
    pub comments: CommentPolicy,
    pub page_size: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
            auto_migrate: flag_var("DB_AUTO_MIGRATE", false),
        });

        let defaults = CommentPolicy::default();
        let comments = CommentPolicy {
            auto_approve_on_direct_post_comment: flag_var(
                "COMMENTS_AUTO_APPROVE_DIRECT",
                defaults.auto_approve_on_direct_post_comment,
            ),
            auto_approve_on_collection_comment: flag_var(
                "COMMENTS_AUTO_APPROVE_COLLECTION",
                defaults.auto_approve_on_collection_comment,
            ),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database,
            jwt: JwtConfig::from_env(),
            comments,
            page_size: parse_var("POSTS_PAGE_SIZE", DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn flag_var(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_flag(&value).unwrap_or_else(|| {
            tracing::warn!(key, value = %value, "Unrecognised boolean, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Parse the usual spellings of a boolean switch.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
