//! Mapping from service results to response bodies.

use quill_core::domain::User;
use quill_core::service::{CommentView, LikeView, Page, PostDetail, PostSummary};
use quill_shared::dto::{
    CommentResponse, LikeResponse, PageResponse, PostDetailResponse, PostListItem, UserResponse,
};

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

pub fn post_item(summary: PostSummary) -> PostListItem {
    let PostSummary {
        post,
        author,
        like_count,
        comment_count,
    } = summary;

    PostListItem {
        id: post.id,
        title: post.title,
        excerpt: post.excerpt,
        author: author.as_ref().map(user),
        timestamp: post.created_at,
        status: post.status.to_string(),
        slug: post.slug,
        like_count,
        comment_count,
    }
}

pub fn post_detail(detail: PostDetail) -> PostDetailResponse {
    let PostDetail { summary, comments } = detail;
    let PostSummary {
        post,
        author,
        like_count,
        comment_count,
    } = summary;

    PostDetailResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        excerpt: post.excerpt,
        author: author.as_ref().map(user),
        timestamp: post.created_at,
        updated_at: post.updated_at,
        status: post.status.to_string(),
        slug: post.slug,
        comments: comments.into_iter().map(comment).collect(),
        like_count,
        comment_count,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    let CommentView {
        comment,
        author,
        display_name,
    } = view;

    CommentResponse {
        id: comment.id,
        post: comment.post_id,
        content: comment.content,
        author: author.as_ref().map(user),
        guest_name: comment.guest_name,
        display_name,
        created_at: comment.created_at,
        is_approved: comment.is_approved,
    }
}

pub fn like(view: LikeView) -> LikeResponse {
    LikeResponse {
        id: view.like.id,
        post: view.like.post_id,
        user: view.user.as_ref().map(user),
        created_at: view.like.created_at,
    }
}

pub fn page<T, U>(page: Page<T>, convert: impl FnMut(T) -> U) -> PageResponse<U> {
    PageResponse {
        count: page.total,
        page: page.page,
        page_size: page.page_size,
        results: page.items.into_iter().map(convert).collect(),
    }
}
