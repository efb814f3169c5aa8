//! Health check and site statistics.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use quill_shared::dto::StatsResponse;

use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
    pub request_id: String,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health/
pub async fn health_check(state: web::Data<AppState>, request_id: RequestId) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
        request_id: request_id.as_str().to_string(),
    };

    HttpResponse::Ok().json(response)
}

/// GET /api/stats/
pub async fn stats(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = state.posts.stats().await?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        published_posts: stats.published_posts,
        users: stats.users,
        comments: stats.comments,
    }))
}
