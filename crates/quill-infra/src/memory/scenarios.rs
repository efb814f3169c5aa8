//! Service rules exercised end to end against the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{Actor, Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthError, BaseRepository, PasswordService, PostFilter, PostOrdering, PostRepository,
    Repositories,
};
use quill_core::service::{
    AccountService, CommentChanges, CommentPathway, CommentPolicy, CommentService, LikeService,
    NewComment, NewPost, NewUser, PostChanges, PostQuery, PostService,
};

use super::InMemoryStore;

/// Reversible "hash" so these tests don't pay for Argon2.
struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain${password}"))
    }
}

struct Blog {
    repos: Repositories,
    accounts: AccountService,
    posts: PostService,
    comments: CommentService,
    likes: LikeService,
}

impl Blog {
    fn new() -> Self {
        let repos = InMemoryStore::new().repositories();
        Self {
            accounts: AccountService::new(repos.users.clone(), Arc::new(PlainPasswords)),
            posts: PostService::new(repos.clone()),
            comments: CommentService::new(repos.clone(), CommentPolicy::default()),
            likes: LikeService::new(repos.clone()),
            repos,
        }
    }

    async fn user(&self, username: &str, first: &str, last: &str) -> Actor {
        let user = self
            .accounts
            .register(NewUser {
                username: username.to_string(),
                email: format!("{}@mail.test", username.replace('@', ".")),
                password: "password123".to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
            })
            .await
            .unwrap();
        Actor::User(user.id)
    }

    async fn post(&self, author: Actor, title: &str, status: PostStatus) -> Uuid {
        self.posts
            .create(
                author,
                NewPost {
                    title: title.to_string(),
                    content: "Body".to_string(),
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }
}

fn comment(content: &str) -> NewComment {
    NewComment {
        content: content.to_string(),
        guest_name: None,
    }
}

#[tokio::test]
async fn test_identical_titles_get_suffixed_slugs() {
    let blog = Blog::new();
    let jane = blog.user("jane", "Jane", "Doe").await;

    let mut slugs = Vec::new();
    for _ in 0..3 {
        let id = blog.post(jane, "Hello World", PostStatus::Published).await;
        let detail = blog.posts.get(jane, id).await.unwrap();
        slugs.push(detail.summary.post.slug);
    }

    assert_eq!(slugs, vec!["hello-world", "hello-world-1", "hello-world-2"]);
}

#[tokio::test]
async fn test_slug_survives_title_edit() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "First Title", PostStatus::Draft).await;

    let post = blog
        .posts
        .update(
            jane,
            id,
            PostChanges {
                title: Some("Second Title".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(post.title, "Second Title");
    assert_eq!(post.slug, "first-title");
}

/// Posts store whose first `losses` inserts fail as if a concurrent writer
/// had just taken the slug.
struct SlugThief {
    inner: Arc<dyn PostRepository>,
    losses: u32,
    inserts: AtomicU32,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for SlugThief {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        if self.inserts.fetch_add(1, Ordering::SeqCst) < self.losses {
            return Err(RepoError::Constraint(format!("slug {} taken", post.slug)));
        }
        self.inner.insert(post).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.inner.update(post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl PostRepository for SlugThief {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_slug(slug).await
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        self.inner.slug_exists(slug).await
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        self.inner.list(filter).await
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        self.inner.count(filter).await
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete_cascade(id).await
    }
}

fn posts_losing_races(losses: u32) -> (PostService, Arc<SlugThief>) {
    let repos = InMemoryStore::new().repositories();
    let thief = Arc::new(SlugThief {
        inner: repos.posts.clone(),
        losses,
        inserts: AtomicU32::new(0),
    });
    let repos = Repositories {
        posts: thief.clone(),
        ..repos
    };
    (PostService::new(repos), thief)
}

fn titled(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "Body".to_string(),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_titles_get_distinct_slugs() {
    let blog = Arc::new(Blog::new());
    let jane = blog.user("jane", "", "").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let blog = blog.clone();
        handles.push(tokio::spawn(async move {
            blog.posts.create(jane, titled("Same Title")).await
        }));
    }

    let mut slugs = HashSet::new();
    for handle in handles {
        let post = handle.await.unwrap().unwrap();
        assert!(post.slug.starts_with("same-title"));
        slugs.insert(post.slug);
    }
    assert_eq!(slugs.len(), 8);
}

#[tokio::test]
async fn test_lost_slug_race_moves_to_next_suffix() {
    let (posts, thief) = posts_losing_races(2);
    let author = Actor::User(Uuid::new_v4());

    let post = posts.create(author, titled("Hot Take")).await.unwrap();

    assert_eq!(post.slug, "hot-take-2");
    assert_eq!(thief.inserts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_slug_races_give_up_with_conflict() {
    let (posts, thief) = posts_losing_races(u32::MAX);
    let author = Actor::User(Uuid::new_v4());

    let err = posts.create(author, titled("Hot Take")).await.unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(thief.inserts.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_explicit_slug_conflict() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    blog.post(jane, "Taken", PostStatus::Published).await;

    let err = blog
        .posts
        .create(
            jane,
            NewPost {
                title: "Another".to_string(),
                content: "Body".to_string(),
                slug: Some("taken".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_toggle_like_twice() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let bob = blog.user("bob", "", "").await;
    let id = blog.post(jane, "Likeable", PostStatus::Published).await;

    blog.likes.toggle(bob, id).await.unwrap();

    let first = blog.likes.toggle(jane, id).await.unwrap();
    assert!(first.liked);
    assert_eq!(first.count, 2);

    let second = blog.likes.toggle(jane, id).await.unwrap();
    assert!(!second.liked);
    assert_eq!(second.count, 1);

    let jane_id = jane.user_id().unwrap();
    assert!(blog.repos.likes.find_by_pair(id, jane_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_toggles_never_duplicate() {
    let blog = Arc::new(Blog::new());
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Racy", PostStatus::Published).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let blog = blog.clone();
        handles.push(tokio::spawn(async move { blog.likes.toggle(jane, id).await }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, Ok(_) | Err(DomainError::Conflict(_))));
    }

    let likes = blog.repos.likes.list(Some(id)).await.unwrap();
    assert!(likes.len() <= 1);
}

#[tokio::test]
async fn test_second_explicit_like_conflicts() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Once", PostStatus::Published).await;

    blog.likes.create(jane, id).await.unwrap();
    let err = blog.likes.create(jane, id).await.unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_display_names_on_comments() {
    let blog = Blog::new();
    let full = blog.user("jane", "Jane", "Doe").await;
    let email = blog.user("jane.doe@example.com", "", "").await;
    let plain = blog.user("jdoe", "", "").await;
    let id = blog.post(full, "Names", PostStatus::Published).await;

    let direct = CommentPathway::DirectPost;
    let by_full = blog.comments.create(full, direct, id, comment("a")).await.unwrap();
    let by_email = blog.comments.create(email, direct, id, comment("b")).await.unwrap();
    let by_plain = blog.comments.create(plain, direct, id, comment("c")).await.unwrap();
    let by_bob = blog
        .comments
        .create(
            Actor::Anonymous,
            direct,
            id,
            NewComment {
                content: "d".to_string(),
                guest_name: Some("Bob".to_string()),
            },
        )
        .await
        .unwrap();
    let by_nobody = blog
        .comments
        .create(Actor::Anonymous, direct, id, comment("e"))
        .await
        .unwrap();

    assert_eq!(by_full.display_name, "Jane Doe");
    assert_eq!(by_email.display_name, "Jane Doe");
    assert_eq!(by_plain.display_name, "jdoe");
    assert_eq!(by_bob.display_name, "Bob");
    assert_eq!(by_nobody.display_name, "Anonymous");
}

#[tokio::test]
async fn test_authenticated_comment_drops_guest_name() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Mine", PostStatus::Published).await;

    let view = blog
        .comments
        .create(
            jane,
            CommentPathway::DirectPost,
            id,
            NewComment {
                content: "hi".to_string(),
                guest_name: Some("Impostor".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(view.comment.author_id, jane.user_id());
    assert!(view.comment.guest_name.is_none());
}

#[tokio::test]
async fn test_non_owner_is_forbidden_everywhere() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let bob = blog.user("bob", "", "").await;

    for status in [PostStatus::Draft, PostStatus::Published] {
        let id = blog.post(jane, "Owned", status).await;

        let update = blog
            .posts
            .update(bob, id, PostChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(update, DomainError::Forbidden), "{status}");

        let delete = blog.posts.delete(bob, id).await.unwrap_err();
        assert!(matches!(delete, DomainError::Forbidden), "{status}");
    }

    let id = blog.post(jane, "Commented", PostStatus::Published).await;
    let view = blog
        .comments
        .create(jane, CommentPathway::DirectPost, id, comment("mine"))
        .await
        .unwrap();
    let changes = CommentChanges {
        content: Some("hijacked".to_string()),
    };
    assert!(matches!(
        blog.comments.update(bob, view.comment.id, changes).await,
        Err(DomainError::Forbidden)
    ));
    assert!(matches!(
        blog.comments.delete(bob, view.comment.id).await,
        Err(DomainError::Forbidden)
    ));

    let like = blog.likes.create(jane, id).await.unwrap();
    assert!(matches!(
        blog.likes.delete(bob, like.like.id).await,
        Err(DomainError::Forbidden)
    ));

    // Nothing changed.
    let detail = blog.posts.get(jane, id).await.unwrap();
    assert_eq!(detail.comments[0].comment.content, "mine");
    assert_eq!(detail.summary.like_count, 1);
}

#[tokio::test]
async fn test_guest_comments_are_never_editable() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Guestbook", PostStatus::Published).await;
    let view = blog
        .comments
        .create(Actor::Anonymous, CommentPathway::DirectPost, id, comment("hey"))
        .await
        .unwrap();

    assert!(matches!(
        blog.comments.delete(jane, view.comment.id).await,
        Err(DomainError::Forbidden)
    ));
}

#[tokio::test]
async fn test_anonymous_mutations_need_authentication() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Locked", PostStatus::Published).await;

    let anon = Actor::Anonymous;
    assert!(matches!(
        blog.posts.delete(anon, id).await,
        Err(DomainError::Unauthenticated)
    ));
    assert!(matches!(
        blog.posts.delete(anon, Uuid::new_v4()).await,
        Err(DomainError::Unauthenticated)
    ));
    assert!(matches!(
        blog.likes.toggle(anon, id).await,
        Err(DomainError::Unauthenticated)
    ));
    assert!(matches!(
        blog.posts
            .create(
                anon,
                NewPost {
                    title: "x".to_string(),
                    content: "y".to_string(),
                    ..Default::default()
                }
            )
            .await,
        Err(DomainError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;

    assert!(matches!(
        blog.posts.delete(jane, Uuid::new_v4()).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        blog.likes.toggle(jane, Uuid::new_v4()).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        blog.comments.get(jane, Uuid::new_v4()).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_comment_pathways_differ_in_approval() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Moderated", PostStatus::Published).await;

    let direct = blog
        .comments
        .create(Actor::Anonymous, CommentPathway::DirectPost, id, comment("direct"))
        .await
        .unwrap();
    let queued_anon = blog
        .comments
        .create(Actor::Anonymous, CommentPathway::Collection, id, comment("anon"))
        .await
        .unwrap();
    let queued_user = blog
        .comments
        .create(jane, CommentPathway::Collection, id, comment("user"))
        .await
        .unwrap();

    assert!(direct.comment.is_approved);
    assert!(!queued_anon.comment.is_approved);
    assert!(!queued_user.comment.is_approved);

    let listed: Vec<Uuid> = blog
        .comments
        .list_for_post(Actor::Anonymous, id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.comment.id)
        .collect();
    assert_eq!(listed, vec![direct.comment.id]);

    // The post owner approves; now it shows up.
    blog.comments.approve(jane, queued_anon.comment.id).await.unwrap();
    let listed = blog.comments.list_for_post(Actor::Anonymous, id).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_only_post_owner_approves() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let bob = blog.user("bob", "", "").await;
    let id = blog.post(jane, "Moderated", PostStatus::Published).await;
    let view = blog
        .comments
        .create(bob, CommentPathway::Collection, id, comment("pending"))
        .await
        .unwrap();

    assert!(matches!(
        blog.comments.approve(bob, view.comment.id).await,
        Err(DomainError::Forbidden)
    ));

    // Unapproved comments stay visible to their author only.
    assert!(blog.comments.get(bob, view.comment.id).await.is_ok());
    assert!(matches!(
        blog.comments.get(Actor::Anonymous, view.comment.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_flipped_policy() {
    let repos = InMemoryStore::new().repositories();
    let accounts = AccountService::new(repos.users.clone(), Arc::new(PlainPasswords));
    let posts = PostService::new(repos.clone());
    let comments = CommentService::new(
        repos.clone(),
        CommentPolicy {
            auto_approve_on_direct_post_comment: false,
            auto_approve_on_collection_comment: true,
        },
    );

    let user = accounts
        .register(NewUser {
            username: "jane".to_string(),
            email: "jane@mail.test".to_string(),
            password: "password123".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let actor = Actor::User(user.id);
    let post = posts
        .create(
            actor,
            NewPost {
                title: "Policy".to_string(),
                content: "Body".to_string(),
                status: Some(PostStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let direct = comments
        .create(actor, CommentPathway::DirectPost, post.id, comment("a"))
        .await
        .unwrap();
    let collected = comments
        .create(actor, CommentPathway::Collection, post.id, comment("b"))
        .await
        .unwrap();

    assert!(!direct.comment.is_approved);
    assert!(collected.comment.is_approved);
}

#[tokio::test]
async fn test_public_listing_hides_drafts() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let bob = blog.user("bob", "", "").await;
    blog.post(jane, "Jane Draft", PostStatus::Draft).await;
    blog.post(jane, "Jane Live", PostStatus::Published).await;
    blog.post(bob, "Bob Draft", PostStatus::Draft).await;

    let page = blog.posts.list_published(PostQuery::default()).await.unwrap();
    let titles: Vec<&str> = page.items.iter().map(|s| s.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Jane Live"]);
    assert_eq!(page.total, 1);

    let mine = blog.posts.list_mine(jane, PostQuery::default()).await.unwrap();
    assert_eq!(mine.total, 2);
    assert!(mine.items.iter().all(|s| s.post.author_id == jane.user_id().unwrap()));
}

#[tokio::test]
async fn test_drafts_hidden_from_other_readers() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let bob = blog.user("bob", "", "").await;
    let id = blog.post(jane, "Secret", PostStatus::Draft).await;

    assert!(blog.posts.get(jane, id).await.is_ok());
    assert!(matches!(
        blog.posts.get(bob, id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        blog.posts.get_by_slug(Actor::Anonymous, "secret").await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        blog.comments
            .create(Actor::Anonymous, CommentPathway::DirectPost, id, comment("peek"))
            .await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_comments_on_drafts_hidden_from_other_readers() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let bob = blog.user("bob", "", "").await;
    let draft = blog.post(jane, "Secret", PostStatus::Draft).await;
    let public = blog.post(jane, "Open", PostStatus::Published).await;

    let hidden = blog
        .comments
        .create(jane, CommentPathway::DirectPost, draft, comment("note to self"))
        .await
        .unwrap();
    let shown = blog
        .comments
        .create(bob, CommentPathway::DirectPost, public, comment("nice"))
        .await
        .unwrap();
    assert!(hidden.comment.is_approved);

    for reader in [bob, Actor::Anonymous] {
        let listed: Vec<Uuid> = blog
            .comments
            .list_approved(reader)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.comment.id)
            .collect();
        assert_eq!(listed, vec![shown.comment.id]);
        assert!(matches!(
            blog.comments.get(reader, hidden.comment.id).await,
            Err(DomainError::NotFound { entity_type: "Comment", .. })
        ));
    }

    assert_eq!(blog.comments.list_approved(jane).await.unwrap().len(), 2);
    assert!(blog.comments.get(jane, hidden.comment.id).await.is_ok());
}

#[tokio::test]
async fn test_search_ordering_and_paging() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    for title in ["Rust Tips", "Cooking", "rusty nails", "Gardening"] {
        blog.post(jane, title, PostStatus::Published).await;
    }

    let found = blog
        .posts
        .list_published(PostQuery {
            search: Some("RUST".to_string()),
            ordering: PostOrdering::TitleAsc,
            ..Default::default()
        })
        .await
        .unwrap();
    let titles: Vec<&str> = found.items.iter().map(|s| s.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Rust Tips", "rusty nails"]);

    let page = blog
        .posts
        .list_published(PostQuery {
            ordering: PostOrdering::TitleAsc,
            page: Some(2),
            page_size: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].post.title, "rusty nails");
}

#[tokio::test]
async fn test_out_of_range_page_is_invalid() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    blog.post(jane, "Only", PostStatus::Published).await;

    let err = blog
        .posts
        .list_published(PostQuery {
            page: Some(u64::MAX),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref errors) if errors[0].field == "page"));

    let far = blog
        .posts
        .list_published(PostQuery {
            page: Some(1_000_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(far.total, 1);
    assert!(far.items.is_empty());
}

#[tokio::test]
async fn test_delete_post_cascades() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Doomed", PostStatus::Published).await;
    blog.comments
        .create(jane, CommentPathway::DirectPost, id, comment("bye"))
        .await
        .unwrap();
    blog.likes.toggle(jane, id).await.unwrap();

    blog.posts.delete(jane, id).await.unwrap();

    let stats = blog.posts.stats().await.unwrap();
    assert_eq!(stats.published_posts, 0);
    assert_eq!(stats.comments, 0);
    assert_eq!(stats.users, 1);
    assert!(blog.repos.likes.list(Some(id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let blog = Blog::new();
    blog.user("jane", "Jane", "Doe").await;

    let dup = blog
        .accounts
        .register(NewUser {
            username: "jane".to_string(),
            email: "other@mail.test".to_string(),
            password: "password123".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(dup, DomainError::Conflict(_)));

    let short = blog
        .accounts
        .register(NewUser {
            username: "kim".to_string(),
            email: "kim@mail.test".to_string(),
            password: "short".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(short, DomainError::Validation(_)));

    assert!(blog.accounts.authenticate("jane", "password123").await.is_ok());
    assert!(matches!(
        blog.accounts.authenticate("jane", "nope-nope").await,
        Err(DomainError::InvalidCredentials)
    ));
    assert!(matches!(
        blog.accounts.authenticate("ghost", "password123").await,
        Err(DomainError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_empty_comment_is_validation_error() {
    let blog = Blog::new();
    let jane = blog.user("jane", "", "").await;
    let id = blog.post(jane, "Strict", PostStatus::Published).await;

    let err = blog
        .comments
        .create(Actor::Anonymous, CommentPathway::DirectPost, id, comment("   "))
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(errors) => assert_eq!(errors[0].field, "content"),
        other => panic!("expected validation error, got {other:?}"),
    }
}
