use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Actor, Post, PostStatus, User, slug};
use crate::error::{DomainError, RepoError, Validator};
use crate::ports::{PostFilter, PostOrdering, Repositories};

use super::comments::CommentView;
use super::{users_by_id, visible_post};

const MAX_TITLE_LEN: usize = 200;
const MAX_EXCERPT_LEN: usize = 500;
/// Inserts that may lose a slug race before giving up.
const MAX_SLUG_COLLISIONS: u32 = 5;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: Option<PostStatus>,
    /// Explicit slug. Derived from the title when absent.
    pub slug: Option<String>,
}

/// Partial update of a post. The slug is never recomputed.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<PostStatus>,
}

/// Listing parameters.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub search: Option<String>,
    pub ordering: PostOrdering,
    /// 1-based.
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// A post with its author and counters.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author: Option<User>,
    pub like_count: u64,
    pub comment_count: u64,
}

/// A post with its approved comments.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub summary: PostSummary,
    pub comments: Vec<CommentView>,
}

/// Site-wide counters.
#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub published_posts: u64,
    pub users: u64,
    pub comments: u64,
}

/// Post authoring, visibility and ownership rules.
#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    default_page_size: u64,
}

impl PostService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.default_page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Create a post owned by the actor.
    pub async fn create(&self, actor: Actor, input: NewPost) -> Result<Post, DomainError> {
        let author_id = actor.require_user()?;

        let excerpt = input.excerpt.unwrap_or_default();
        let mut validator = Validator::new();
        validator
            .required("title", &input.title)
            .max_len("title", &input.title, MAX_TITLE_LEN)
            .required("content", &input.content)
            .max_len("excerpt", &excerpt, MAX_EXCERPT_LEN);
        if let Some(slug) = &input.slug {
            validator.check(
                slug::is_valid(slug),
                "slug",
                "Enter a valid slug consisting of lowercase letters, numbers, underscores or hyphens.",
            );
        }
        validator.finish()?;

        let post = Post::new(
            author_id,
            input.title.trim().to_string(),
            input.content,
            excerpt,
            input.status.unwrap_or_default(),
        );

        let post = match input.slug {
            Some(explicit) => self.insert_with_slug(post, explicit).await?,
            None => self.insert_with_derived_slug(post).await?,
        };

        tracing::info!(post_id = %post.id, slug = %post.slug, author_id = %author_id, "Post created");
        Ok(post)
    }

    async fn insert_with_slug(&self, mut post: Post, slug: String) -> Result<Post, DomainError> {
        if self.repos.posts.slug_exists(&slug).await? {
            return Err(DomainError::Conflict(format!("Slug '{slug}' is already in use")));
        }

        post.slug = slug;
        self.repos.posts.insert(post).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::Conflict("Slug is already in use".to_string()),
            other => other.into(),
        })
    }

    /// Insert under the first free `base`, `base-1`, `base-2`, ... slug.
    ///
    /// The existence check only picks a starting candidate; the unique index
    /// decides, and a lost race moves on to the next suffix.
    async fn insert_with_derived_slug(&self, mut post: Post) -> Result<Post, DomainError> {
        let base = slug::slugify(&post.title);
        let mut attempt = 0;
        let mut collisions = 0;

        loop {
            let candidate = slug::candidate(&base, attempt);
            attempt += 1;

            if self.repos.posts.slug_exists(&candidate).await? {
                continue;
            }

            post.slug = candidate;
            match self.repos.posts.insert(post.clone()).await {
                Ok(saved) => return Ok(saved),
                Err(RepoError::Constraint(msg)) => {
                    collisions += 1;
                    tracing::warn!(slug = %post.slug, collisions, error = %msg, "Slug taken by a concurrent insert");
                    if collisions >= MAX_SLUG_COLLISIONS {
                        return Err(DomainError::Conflict(format!(
                            "Could not assign a unique slug for '{}'",
                            post.title
                        )));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Apply changes to a post owned by the actor.
    pub async fn update(
        &self,
        actor: Actor,
        post_id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        actor.require_user()?;
        let mut post = self.find(post_id).await?;
        actor.ensure_owner(Some(post.author_id))?;

        let mut validator = Validator::new();
        if let Some(title) = &changes.title {
            validator
                .required("title", title)
                .max_len("title", title, MAX_TITLE_LEN);
        }
        if let Some(content) = &changes.content {
            validator.required("content", content);
        }
        if let Some(excerpt) = &changes.excerpt {
            validator.max_len("excerpt", excerpt, MAX_EXCERPT_LEN);
        }
        validator.finish()?;

        if let Some(title) = changes.title {
            post.title = title.trim().to_string();
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(excerpt) = changes.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(status) = changes.status {
            post.status = status;
        }
        post.updated_at = Utc::now();

        let post = self.repos.posts.update(post).await?;
        tracing::info!(post_id = %post.id, status = %post.status, "Post updated");
        Ok(post)
    }

    /// Delete a post owned by the actor, with its comments and likes.
    pub async fn delete(&self, actor: Actor, post_id: Uuid) -> Result<(), DomainError> {
        actor.require_user()?;
        let post = self.find(post_id).await?;
        actor.ensure_owner(Some(post.author_id))?;

        self.repos.posts.delete_cascade(post_id).await?;
        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// A single post with its approved comments.
    pub async fn get(&self, actor: Actor, post_id: Uuid) -> Result<PostDetail, DomainError> {
        let post = visible_post(&self.repos, actor, post_id).await?;
        self.detail(post).await
    }

    pub async fn get_by_slug(&self, actor: Actor, slug: &str) -> Result<PostDetail, DomainError> {
        let post = self
            .repos
            .posts
            .find_by_slug(slug)
            .await?
            .filter(|post| post.is_visible_to(actor))
            .ok_or_else(|| DomainError::not_found("Post", slug))?;
        self.detail(post).await
    }

    /// Published posts, for everyone.
    pub async fn list_published(&self, query: PostQuery) -> Result<Page<PostSummary>, DomainError> {
        self.list(
            PostFilter {
                status: Some(PostStatus::Published),
                ..PostFilter::default()
            },
            query,
        )
        .await
    }

    /// The actor's own posts, drafts included.
    pub async fn list_mine(
        &self,
        actor: Actor,
        query: PostQuery,
    ) -> Result<Page<PostSummary>, DomainError> {
        let user_id = actor.require_user()?;
        self.list(
            PostFilter {
                author_id: Some(user_id),
                ..PostFilter::default()
            },
            query,
        )
        .await
    }

    pub async fn stats(&self) -> Result<Stats, DomainError> {
        let published_posts = self
            .repos
            .posts
            .count(&PostFilter {
                status: Some(PostStatus::Published),
                ..PostFilter::default()
            })
            .await?;

        Ok(Stats {
            published_posts,
            users: self.repos.users.count().await?,
            comments: self.repos.comments.count().await?,
        })
    }

    async fn list(
        &self,
        mut filter: PostFilter,
        query: PostQuery,
    ) -> Result<Page<PostSummary>, DomainError> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query
            .page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, MAX_PAGE_SIZE);
        // Postgres takes a signed 64-bit OFFSET.
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| DomainError::invalid("page", "Invalid page."))?;

        filter.search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        filter.ordering = query.ordering;

        let total = self.repos.posts.count(&filter).await?;

        filter.limit = Some(page_size);
        filter.offset = offset;
        let posts = self.repos.posts.list(&filter).await?;

        let authors = users_by_id(&self.repos, posts.iter().map(|p| p.author_id)).await?;
        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            let author = authors.get(&post.author_id).cloned();
            items.push(self.summary(post, author).await?);
        }

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    async fn find(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    async fn summary(&self, post: Post, author: Option<User>) -> Result<PostSummary, DomainError> {
        let like_count = self.repos.likes.count_for_post(post.id).await?;
        let comment_count = self.repos.comments.count_for_post(post.id).await?;

        Ok(PostSummary {
            post,
            author,
            like_count,
            comment_count,
        })
    }

    async fn detail(&self, post: Post) -> Result<PostDetail, DomainError> {
        let comments = self.repos.comments.list_for_post(post.id, true).await?;

        let users = users_by_id(
            &self.repos,
            comments
                .iter()
                .filter_map(|c| c.author_id)
                .chain(std::iter::once(post.author_id)),
        )
        .await?;

        let author = users.get(&post.author_id).cloned();
        let comments = comments
            .into_iter()
            .map(|comment| {
                let author = comment.author_id.and_then(|id| users.get(&id)).cloned();
                CommentView::new(comment, author)
            })
            .collect();

        Ok(PostDetail {
            summary: self.summary(post, author).await?,
            comments,
        })
    }
}
