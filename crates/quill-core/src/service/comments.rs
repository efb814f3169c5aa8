use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Actor, Comment, User, display_name};
use crate::error::{DomainError, Validator};
use crate::ports::Repositories;

use super::{users_by_id, visible_post};

const MAX_GUEST_NAME_LEN: usize = 100;

/// The two routes through which a comment can be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPathway {
    /// Commenting directly on a post (`/posts/{id}/add_comment/`).
    DirectPost,
    /// The generic comment collection (`/comments/`).
    Collection,
}

/// Auto-approval switches, one per creation pathway.
///
/// The defaults keep the historical asymmetry: direct comments go live
/// immediately, collection comments wait for approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPolicy {
    pub auto_approve_on_direct_post_comment: bool,
    pub auto_approve_on_collection_comment: bool,
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self {
            auto_approve_on_direct_post_comment: true,
            auto_approve_on_collection_comment: false,
        }
    }
}

impl CommentPolicy {
    pub fn auto_approves(&self, pathway: CommentPathway) -> bool {
        match pathway {
            CommentPathway::DirectPost => self.auto_approve_on_direct_post_comment,
            CommentPathway::Collection => self.auto_approve_on_collection_comment,
        }
    }
}

/// Comment submission. `guest_name` is ignored for authenticated actors.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub content: String,
    pub guest_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub content: Option<String>,
}

/// A comment with its resolved author label.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Option<User>,
    pub display_name: String,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<User>) -> Self {
        let display_name = display_name(author.as_ref(), comment.guest_name.as_deref());
        Self {
            comment,
            author,
            display_name,
        }
    }
}

/// Comment attribution, approval and ownership rules.
#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
    policy: CommentPolicy,
}

impl CommentService {
    pub fn new(repos: Repositories, policy: CommentPolicy) -> Self {
        Self { repos, policy }
    }

    /// Create a comment on a post the actor can see.
    ///
    /// Anonymous actors are allowed; their comment carries a guest name
    /// (defaulting to "Anonymous") instead of an author.
    pub async fn create(
        &self,
        actor: Actor,
        pathway: CommentPathway,
        post_id: Uuid,
        input: NewComment,
    ) -> Result<CommentView, DomainError> {
        let mut validator = Validator::new();
        validator.required("content", &input.content);
        if !actor.is_authenticated() {
            if let Some(name) = &input.guest_name {
                validator.max_len("guest_name", name.trim(), MAX_GUEST_NAME_LEN);
            }
        }
        validator.finish()?;

        let post = visible_post(&self.repos, actor, post_id).await?;
        let approved = self.policy.auto_approves(pathway);

        let comment = match actor {
            Actor::User(author_id) => Comment::by_user(post.id, author_id, input.content, approved),
            Actor::Anonymous => Comment::by_guest(post.id, input.guest_name, input.content, approved),
        };
        let comment = self.repos.comments.insert(comment).await?;

        tracing::info!(
            comment_id = %comment.id,
            post_id = %post.id,
            guest = comment.is_guest(),
            approved,
            ?pathway,
            "Comment created"
        );
        self.view(comment).await
    }

    /// Approved comments on a post, newest first.
    pub async fn list_for_post(
        &self,
        actor: Actor,
        post_id: Uuid,
    ) -> Result<Vec<CommentView>, DomainError> {
        let post = visible_post(&self.repos, actor, post_id).await?;
        let comments = self.repos.comments.list_for_post(post.id, true).await?;
        self.views(comments).await
    }

    /// Every approved comment on a post the actor can see, newest first.
    pub async fn list_approved(&self, actor: Actor) -> Result<Vec<CommentView>, DomainError> {
        let comments = self.repos.comments.list_approved().await?;

        let mut visible: HashMap<Uuid, bool> = HashMap::new();
        let mut shown = Vec::with_capacity(comments.len());
        for comment in comments {
            let post_visible = match visible.get(&comment.post_id) {
                Some(&known) => known,
                None => {
                    let known = self
                        .repos
                        .posts
                        .find_by_id(comment.post_id)
                        .await?
                        .is_some_and(|post| post.is_visible_to(actor));
                    visible.insert(comment.post_id, known);
                    known
                }
            };
            if post_visible {
                shown.push(comment);
            }
        }

        self.views(shown).await
    }

    /// A single comment. Unapproved comments are only visible to their author,
    /// and comments on a draft only to the draft's author.
    pub async fn get(&self, actor: Actor, comment_id: Uuid) -> Result<CommentView, DomainError> {
        let comment = self.find(comment_id).await?;

        let is_author = actor.user_id().is_some_and(|id| comment.is_authored_by(id));
        if !comment.is_approved && !is_author {
            return Err(DomainError::not_found("Comment", comment_id));
        }
        match visible_post(&self.repos, actor, comment.post_id).await {
            Ok(_) => {}
            Err(DomainError::NotFound { .. }) => {
                return Err(DomainError::not_found("Comment", comment_id));
            }
            Err(e) => return Err(e),
        }

        self.view(comment).await
    }

    /// Edit a comment. Only its author may; guest comments are never editable.
    pub async fn update(
        &self,
        actor: Actor,
        comment_id: Uuid,
        changes: CommentChanges,
    ) -> Result<CommentView, DomainError> {
        actor.require_user()?;
        let mut comment = self.find(comment_id).await?;
        actor.ensure_owner(comment.author_id)?;

        if let Some(content) = changes.content {
            Validator::new().required("content", &content).finish()?;
            comment.content = content;
        }

        let comment = self.repos.comments.update(comment).await?;
        tracing::info!(comment_id = %comment.id, "Comment updated");
        self.view(comment).await
    }

    pub async fn delete(&self, actor: Actor, comment_id: Uuid) -> Result<(), DomainError> {
        actor.require_user()?;
        let comment = self.find(comment_id).await?;
        actor.ensure_owner(comment.author_id)?;

        self.repos.comments.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    /// Approve a comment. Only the owner of the commented post may.
    pub async fn approve(&self, actor: Actor, comment_id: Uuid) -> Result<CommentView, DomainError> {
        actor.require_user()?;
        let mut comment = self.find(comment_id).await?;

        let post = self
            .repos
            .posts
            .find_by_id(comment.post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", comment.post_id))?;
        actor.ensure_owner(Some(post.author_id))?;

        if !comment.is_approved {
            comment.is_approved = true;
            comment = self.repos.comments.update(comment).await?;
            tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment approved");
        }

        self.view(comment).await
    }

    async fn find(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))
    }

    async fn view(&self, comment: Comment) -> Result<CommentView, DomainError> {
        let author = match comment.author_id {
            Some(id) => self.repos.users.find_by_id(id).await?,
            None => None,
        };
        Ok(CommentView::new(comment, author))
    }

    async fn views(&self, comments: Vec<Comment>) -> Result<Vec<CommentView>, DomainError> {
        let users = users_by_id(&self.repos, comments.iter().filter_map(|c| c.author_id)).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = comment.author_id.and_then(|id| users.get(&id)).cloned();
                CommentView::new(comment, author)
            })
            .collect())
    }
}
