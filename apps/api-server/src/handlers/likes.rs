//! Like handlers. All of them require a signed-in user.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{CreateLikeRequest, LikeListParams};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/likes/?post={id}
pub async fn list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<LikeListParams>,
) -> AppResult<HttpResponse> {
    let likes = state.likes.list(identity.actor(), params.post).await?;
    let body: Vec<_> = likes.into_iter().map(views::like).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/likes/ - a second like on the same post is a conflict
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<CreateLikeRequest>,
) -> AppResult<HttpResponse> {
    let view = state.likes.create(identity.actor(), body.post).await?;
    Ok(HttpResponse::Created().json(views::like(view)))
}

/// GET /api/likes/{id}/
pub async fn get(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state.likes.get(identity.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::like(view)))
}

/// DELETE /api/likes/{id}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .likes
        .delete(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
