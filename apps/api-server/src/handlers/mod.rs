//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod likes;
mod posts;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Extractor configs that report malformed input as RFC 7807 bad requests.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    );
}

/// Register shared state and all application routes.
///
/// Every route carries a trailing slash; the server normalizes request paths
/// to match.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()))
        .app_data(web::Data::new(state.tokens.clone()));
    extractor_configs(cfg);

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health/", web::get().to(health::health_check))
            .route("/stats/", web::get().to(health::stats))
            // Accounts and tokens
            .route("/register/", web::post().to(auth::register))
            .route("/login/", web::post().to(auth::login))
            .route("/token/", web::post().to(auth::login))
            .route("/token/refresh/", web::post().to(auth::refresh))
            .route("/me/", web::get().to(auth::me))
            // Posts
            .service(
                web::scope("/posts")
                    .route("/", web::get().to(posts::list))
                    .route("/", web::post().to(posts::create))
                    .route("/mine/", web::get().to(posts::mine))
                    .route("/by-slug/{slug}/", web::get().to(posts::get_by_slug))
                    .route("/{id}/", web::get().to(posts::get))
                    .route("/{id}/", web::put().to(posts::update))
                    .route("/{id}/", web::patch().to(posts::update))
                    .route("/{id}/", web::delete().to(posts::delete))
                    .route("/{id}/like/", web::post().to(posts::like))
                    .route("/{id}/comments/", web::get().to(posts::comments))
                    .route("/{id}/add_comment/", web::post().to(posts::add_comment)),
            )
            // Comments
            .service(
                web::scope("/comments")
                    .route("/", web::get().to(comments::list))
                    .route("/", web::post().to(comments::create))
                    .route("/{id}/", web::get().to(comments::get))
                    .route("/{id}/", web::put().to(comments::update))
                    .route("/{id}/", web::patch().to(comments::update))
                    .route("/{id}/", web::delete().to(comments::delete))
                    .route("/{id}/approve/", web::post().to(comments::approve)),
            )
            // Likes
            .service(
                web::scope("/likes")
                    .route("/", web::get().to(likes::list))
                    .route("/", web::post().to(likes::create))
                    .route("/{id}/", web::get().to(likes::get))
                    .route("/{id}/", web::delete().to(likes::delete)),
            ),
    );
}
