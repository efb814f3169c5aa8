//! Application services - the authorization and attribution rules.
//!
//! Every operation takes the acting identity as an explicit [`Actor`].

mod accounts;
mod comments;
mod likes;
mod posts;

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Actor, Post, User};
use crate::error::DomainError;
use crate::ports::Repositories;

pub use accounts::{AccountService, NewUser};
pub use comments::{
    CommentChanges, CommentPathway, CommentPolicy, CommentService, CommentView, NewComment,
};
pub use likes::{LikeService, LikeToggle, LikeView};
pub use posts::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NewPost, Page, PostChanges, PostDetail, PostQuery,
    PostService, PostSummary, Stats,
};

/// Load a post the actor is allowed to see.
///
/// Drafts are visible to their owner only; everyone else gets `NotFound`.
pub(crate) async fn visible_post(
    repos: &Repositories,
    actor: Actor,
    post_id: Uuid,
) -> Result<Post, DomainError> {
    let post = repos
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    if post.is_visible_to(actor) {
        Ok(post)
    } else {
        Err(DomainError::not_found("Post", post_id))
    }
}

/// Fetch the users behind a set of ids, keyed by id.
pub(crate) async fn users_by_id(
    repos: &Repositories,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, User>, DomainError> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = repos.users.find_by_ids(&ids).await?;
    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}
