use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Like, Post, PostStatus, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    ///
    /// Unique index violations surface as [`RepoError::Constraint`].
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their login handle.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Fetch several users at once. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    TitleAsc,
    TitleDesc,
}

/// Criteria for listing posts.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    /// Case-insensitive match against title, content and excerpt.
    pub search: Option<String>,
    pub ordering: PostOrdering,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Number of posts matching `filter`, ignoring limit and offset.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Delete a post together with its comments and likes.
    async fn delete_cascade(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, newest first.
    async fn list_for_post(
        &self,
        post_id: Uuid,
        approved_only: bool,
    ) -> Result<Vec<Comment>, RepoError>;

    /// All approved comments, newest first.
    async fn list_approved(&self) -> Result<Vec<Comment>, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// Like repository.
///
/// `insert` must reject a second like for the same (post, user) pair
/// with [`RepoError::Constraint`].
#[async_trait]
pub trait LikeRepository: BaseRepository<Like, Uuid> {
    async fn find_by_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError>;

    /// Remove the like for a pair. Returns whether a row was removed.
    async fn delete_by_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    /// Likes, newest first, optionally restricted to one post.
    async fn list(&self, post_id: Option<Uuid>) -> Result<Vec<Like>, RepoError>;
}

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
}
