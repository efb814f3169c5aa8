//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::service::{CommentChanges, CommentPathway, NewComment};
use quill_shared::dto::{CreateCommentRequest, UpdateCommentRequest};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/comments/ - approved comments on posts the requester can see
pub async fn list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list_approved(identity.actor()).await?;
    let body: Vec<_> = comments.into_iter().map(views::comment).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/comments/
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post_id = req
        .post
        .ok_or_else(|| AppError::invalid("post", "This field is required."))?;

    let view = state
        .comments
        .create(
            identity.actor(),
            CommentPathway::Collection,
            post_id,
            NewComment {
                content: req.content,
                guest_name: req.guest_name,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(views::comment(view)))
}

/// GET /api/comments/{id}/
pub async fn get(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state
        .comments
        .get(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(views::comment(view)))
}

/// PUT or PATCH /api/comments/{id}/ - author only
pub async fn update(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let view = state
        .comments
        .update(
            identity.actor(),
            path.into_inner(),
            CommentChanges {
                content: body.into_inner().content,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(views::comment(view)))
}

/// DELETE /api/comments/{id}/ - author only
pub async fn delete(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/comments/{id}/approve/ - owner of the post only
pub async fn approve(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state
        .comments
        .approve(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(views::comment(view)))
}
