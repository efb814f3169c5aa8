//! In-memory store - used as fallback when no database is configured.
//!
//! Enforces the same unique indexes and cascades as the PostgreSQL schema.
//! Note: Data is lost on process restart.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Like, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, LikeRepository, PostFilter, PostOrdering, PostRepository,
    Repositories, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    likes: HashMap<Uuid, Like>,
}

impl Tables {
    fn remove_post(&mut self, id: Uuid) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.post_id != id);
        self.likes.retain(|_, l| l.post_id != id);
        true
    }
}

type Shared = Arc<RwLock<Tables>>;

/// Every table of the blog, behind one async lock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Shared,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handles sharing this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(InMemoryUserRepository(self.tables.clone())),
            posts: Arc::new(InMemoryPostRepository(self.tables.clone())),
            comments: Arc::new(InMemoryCommentRepository(self.tables.clone())),
            likes: Arc::new(InMemoryLikeRepository(self.tables.clone())),
        }
    }
}

fn unique_violation(index: &str) -> RepoError {
    RepoError::Constraint(format!("duplicate key value violates unique constraint \"{index}\""))
}

pub struct InMemoryUserRepository(Shared);

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.0.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.0.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(unique_violation("users_pkey"));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(unique_violation("users_username_key"));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(unique_violation("users_email_key"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.0.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        let clash = tables.users.values().any(|u| {
            u.id != user.id && (u.username == user.username || u.email == user.email)
        });
        if clash {
            return Err(unique_violation("users_username_key"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != Some(id));
        tables.likes.retain(|_, l| l.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.0.read().await.users.len() as u64)
    }
}

pub struct InMemoryPostRepository(Shared);

fn matches_filter(post: &Post, filter: &PostFilter) -> bool {
    if filter.status.is_some_and(|s| s != post.status) {
        return false;
    }
    if filter.author_id.is_some_and(|a| a != post.author_id) {
        return false;
    }
    match &filter.search {
        Some(search) => {
            let needle = search.to_lowercase();
            [&post.title, &post.content, &post.excerpt]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        }
        None => true,
    }
}

fn compare(ordering: PostOrdering, a: &Post, b: &Post) -> Ordering {
    let primary = match ordering {
        PostOrdering::NewestFirst => b.created_at.cmp(&a.created_at),
        PostOrdering::OldestFirst => a.created_at.cmp(&b.created_at),
        PostOrdering::TitleAsc => a.title.cmp(&b.title),
        PostOrdering::TitleDesc => b.title.cmp(&a.title),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.0.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(unique_violation("posts_pkey"));
        }
        if tables.posts.values().any(|p| p.slug == post.slug) {
            return Err(unique_violation("posts_slug_key"));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.0.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(unique_violation("posts_slug_key"));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.delete_cascade(id).await
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self.0.read().await.posts.values().any(|p| p.slug == slug))
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let tables = self.0.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| matches_filter(p, filter))
            .cloned()
            .collect();
        posts.sort_by(|a, b| compare(filter.ordering, a, b));

        let offset = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let limit = filter
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(posts.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| matches_filter(p, filter))
            .count() as u64)
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), RepoError> {
        if self.0.write().await.remove_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

pub struct InMemoryCommentRepository(Shared);

fn newest_first(mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    comments
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.0.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.0.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Query("comment references a missing post".to_string()));
        }
        if tables.comments.contains_key(&comment.id) {
            return Err(unique_violation("comments_pkey"));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.0.write().await;
        match tables.comments.get_mut(&comment.id) {
            Some(slot) => {
                *slot = comment.clone();
                Ok(comment)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.0.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(
        &self,
        post_id: Uuid,
        approved_only: bool,
    ) -> Result<Vec<Comment>, RepoError> {
        let tables = self.0.read().await;
        Ok(newest_first(
            tables
                .comments
                .values()
                .filter(|c| c.post_id == post_id && (c.is_approved || !approved_only))
                .cloned()
                .collect(),
        ))
    }

    async fn list_approved(&self) -> Result<Vec<Comment>, RepoError> {
        let tables = self.0.read().await;
        Ok(newest_first(
            tables
                .comments
                .values()
                .filter(|c| c.is_approved)
                .cloned()
                .collect(),
        ))
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as u64)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.0.read().await.comments.len() as u64)
    }
}

pub struct InMemoryLikeRepository(Shared);

#[async_trait]
impl BaseRepository<Like, Uuid> for InMemoryLikeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Like>, RepoError> {
        Ok(self.0.read().await.likes.get(&id).cloned())
    }

    async fn insert(&self, like: Like) -> Result<Like, RepoError> {
        let mut tables = self.0.write().await;
        if !tables.posts.contains_key(&like.post_id) {
            return Err(RepoError::Query("like references a missing post".to_string()));
        }
        if tables
            .likes
            .values()
            .any(|l| l.post_id == like.post_id && l.user_id == like.user_id)
        {
            return Err(unique_violation("idx_likes_post_user"));
        }
        tables.likes.insert(like.id, like.clone());
        Ok(like)
    }

    async fn update(&self, like: Like) -> Result<Like, RepoError> {
        let mut tables = self.0.write().await;
        match tables.likes.get_mut(&like.id) {
            Some(slot) => {
                *slot = like.clone();
                Ok(like)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.0.write().await.likes.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl LikeRepository for InMemoryLikeRepository {
    async fn find_by_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .likes
            .values()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
            .cloned())
    }

    async fn delete_by_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.0.write().await;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|_, l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(tables.likes.len() < before)
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.0.read().await;
        Ok(tables.likes.values().filter(|l| l.post_id == post_id).count() as u64)
    }

    async fn list(&self, post_id: Option<Uuid>) -> Result<Vec<Like>, RepoError> {
        let tables = self.0.read().await;
        let mut likes: Vec<Like> = tables
            .likes
            .values()
            .filter(|l| post_id.is_none_or(|p| l.post_id == p))
            .cloned()
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(likes)
    }
}


#[cfg(test)]
mod scenarios;
