//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::PostStatus;
use quill_core::ports::PostOrdering;
use quill_core::service::{
    CommentPathway, LikeToggle, NewComment, NewPost, PostChanges, PostQuery,
};
use quill_shared::dto::{
    CreateCommentRequest, CreatePostRequest, LikeToggleResponse, PostListParams,
    UpdatePostRequest,
};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `?ordering=`, as accepted by the listings. Unknown fields fall back to
/// newest first.
fn parse_ordering(ordering: Option<&str>) -> PostOrdering {
    match ordering.map(str::trim) {
        Some("timestamp") => PostOrdering::OldestFirst,
        Some("title") => PostOrdering::TitleAsc,
        Some("-title") => PostOrdering::TitleDesc,
        _ => PostOrdering::NewestFirst,
    }
}

fn parse_status(status: Option<String>) -> AppResult<Option<PostStatus>> {
    status
        .map(|s| {
            s.trim().parse::<PostStatus>().map_err(|_| {
                AppError::invalid("status", format!("\"{s}\" is not a valid choice."))
            })
        })
        .transpose()
}

fn post_query(params: PostListParams) -> PostQuery {
    PostQuery {
        search: params.search,
        ordering: parse_ordering(params.ordering.as_deref()),
        page: params.page,
        page_size: params.page_size,
    }
}

/// GET /api/posts/ - published posts only
pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<PostListParams>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_published(post_query(params.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(views::page(page, views::post_item)))
}

/// GET /api/posts/mine/ - the requester's posts, drafts included
pub async fn mine(
    state: web::Data<AppState>,
    identity: Identity,
    params: web::Query<PostListParams>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_mine(identity.actor(), post_query(params.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(views::page(page, views::post_item)))
}

/// POST /api/posts/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let actor = identity.actor();

    let post = state
        .posts
        .create(
            actor,
            NewPost {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                status: parse_status(req.status)?,
                slug: req.slug,
            },
        )
        .await?;

    let detail = state.posts.get(actor, post.id).await?;
    Ok(HttpResponse::Created().json(views::post_detail(detail)))
}

/// GET /api/posts/{id}/
pub async fn get(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state.posts.get(identity.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::post_detail(detail)))
}

/// GET /api/posts/by-slug/{slug}/
pub async fn get_by_slug(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let detail = state.posts.get_by_slug(identity.actor(), &path).await?;
    Ok(HttpResponse::Ok().json(views::post_detail(detail)))
}

/// PUT or PATCH /api/posts/{id}/ - owner only
pub async fn update(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let actor = identity.actor();
    let post_id = path.into_inner();

    let changes = PostChanges {
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        status: parse_status(req.status)?,
    };
    state.posts.update(actor, post_id, changes).await?;

    let detail = state.posts.get(actor, post_id).await?;
    Ok(HttpResponse::Ok().json(views::post_detail(detail)))
}

/// DELETE /api/posts/{id}/ - owner only
pub async fn delete(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{id}/like/ - toggle
pub async fn like(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let LikeToggle { liked, count } = state
        .likes
        .toggle(identity.actor(), path.into_inner())
        .await?;

    let (mut response, message) = if liked {
        (HttpResponse::Created(), "Post liked")
    } else {
        (HttpResponse::Ok(), "Post unliked")
    };

    Ok(response.json(LikeToggleResponse {
        liked,
        count,
        message: message.to_string(),
    }))
}

/// GET /api/posts/{id}/comments/ - approved comments
pub async fn comments(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state
        .comments
        .list_for_post(identity.actor(), path.into_inner())
        .await?;
    let body: Vec<_> = comments.into_iter().map(views::comment).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/posts/{id}/add_comment/ - guests welcome
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let view = state
        .comments
        .create(
            identity.actor(),
            CommentPathway::DirectPost,
            path.into_inner(),
            NewComment {
                content: req.content,
                guest_name: req.guest_name,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(views::comment(view)))
}
