use uuid::Uuid;

use crate::domain::{Actor, Like, User};
use crate::error::{DomainError, RepoError};
use crate::ports::Repositories;

use super::{users_by_id, visible_post};

/// Insert/delete rounds a toggle may lose to concurrent toggles.
const MAX_TOGGLE_ATTEMPTS: usize = 3;

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    /// Likes on the post after the toggle.
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct LikeView {
    pub like: Like,
    pub user: Option<User>,
}

/// Like toggling and ownership rules.
#[derive(Clone)]
pub struct LikeService {
    repos: Repositories,
}

impl LikeService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Like the post, or remove the actor's like if there already is one.
    ///
    /// The (post, user) unique index arbitrates: an insert that hits it
    /// turns into a delete, and a delete that finds nothing (someone else
    /// toggled in between) goes back to inserting.
    pub async fn toggle(&self, actor: Actor, post_id: Uuid) -> Result<LikeToggle, DomainError> {
        let user_id = actor.require_user()?;
        let post = visible_post(&self.repos, actor, post_id).await?;

        for _ in 0..MAX_TOGGLE_ATTEMPTS {
            match self.repos.likes.insert(Like::new(post.id, user_id)).await {
                Ok(_) => {
                    let count = self.repos.likes.count_for_post(post.id).await?;
                    tracing::info!(post_id = %post.id, user_id = %user_id, count, "Post liked");
                    return Ok(LikeToggle { liked: true, count });
                }
                Err(RepoError::Constraint(_)) => {
                    if self.repos.likes.delete_by_pair(post.id, user_id).await? {
                        let count = self.repos.likes.count_for_post(post.id).await?;
                        tracing::info!(post_id = %post.id, user_id = %user_id, count, "Post unliked");
                        return Ok(LikeToggle {
                            liked: false,
                            count,
                        });
                    }
                    tracing::debug!(post_id = %post.id, user_id = %user_id, "Like vanished mid-toggle, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::Conflict(
            "Like state changed concurrently, try again".to_string(),
        ))
    }

    /// Create a like without toggling. A second like is a conflict.
    pub async fn create(&self, actor: Actor, post_id: Uuid) -> Result<LikeView, DomainError> {
        let user_id = actor.require_user()?;
        let post = visible_post(&self.repos, actor, post_id).await?;

        let already_liked =
            || DomainError::Conflict("You have already liked this post.".to_string());
        if self.repos.likes.find_by_pair(post.id, user_id).await?.is_some() {
            return Err(already_liked());
        }

        let like = self
            .repos
            .likes
            .insert(Like::new(post.id, user_id))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => already_liked(),
                other => other.into(),
            })?;

        tracing::info!(like_id = %like.id, post_id = %post.id, "Like created");
        self.view(like).await
    }

    /// Likes visible to authenticated users, optionally for one post.
    pub async fn list(
        &self,
        actor: Actor,
        post_id: Option<Uuid>,
    ) -> Result<Vec<LikeView>, DomainError> {
        actor.require_user()?;
        let likes = self.repos.likes.list(post_id).await?;

        let users = users_by_id(&self.repos, likes.iter().map(|l| l.user_id)).await?;
        Ok(likes
            .into_iter()
            .map(|like| {
                let user = users.get(&like.user_id).cloned();
                LikeView { like, user }
            })
            .collect())
    }

    pub async fn get(&self, actor: Actor, like_id: Uuid) -> Result<LikeView, DomainError> {
        actor.require_user()?;
        let like = self.find(like_id).await?;
        self.view(like).await
    }

    /// Remove a like. Only the user who liked may.
    pub async fn delete(&self, actor: Actor, like_id: Uuid) -> Result<(), DomainError> {
        actor.require_user()?;
        let like = self.find(like_id).await?;
        actor.ensure_owner(Some(like.user_id))?;

        self.repos.likes.delete(like_id).await?;
        tracing::info!(like_id = %like_id, post_id = %like.post_id, "Like removed");
        Ok(())
    }

    async fn find(&self, like_id: Uuid) -> Result<Like, DomainError> {
        self.repos
            .likes
            .find_by_id(like_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Like", like_id))
    }

    async fn view(&self, like: Like) -> Result<LikeView, DomainError> {
        let user = self.repos.users.find_by_id(like.user_id).await?;
        Ok(LikeView { like, user })
    }
}
