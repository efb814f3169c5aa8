//! End-to-end handler tests over the in-memory store.

use std::sync::Arc;

use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};

use quill_core::ports::{AuthError, PasswordService};
use quill_core::service::CommentPolicy;
use quill_infra::{InMemoryStore, JwtConfig, JwtTokenService};

use super::configure;
use crate::state::AppState;

struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain${password}"))
    }
}

fn test_state() -> AppState {
    let jwt = JwtConfig {
        secret: "handler-test-secret".to_string(),
        ..JwtConfig::default()
    };

    AppState::from_parts(
        InMemoryStore::new().repositories(),
        Arc::new(JwtTokenService::new(jwt)),
        Arc::new(PlainPasswords),
        CommentPolicy::default(),
        10,
        "memory",
    )
}

/// Serve one request against a fresh app over the shared state.
async fn send(state: &AppState, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .configure(|cfg| configure(cfg, state)),
    )
    .await;

    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

/// Register a user and return its access token.
async fn register(app: &AppState, username: &str) -> String {
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/register/").set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["access"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

async fn create_post(app: &AppState, token: &str, title: &str, status: &str) -> Value {
    let (code, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .insert_header(bearer(token))
            .set_json(json!({ "title": title, "content": "Body text", "status": status })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
    body
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let app = test_state();

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_login_refresh_and_me() {
    let app = test_state();
    register(&app, "alice").await;

    let (status, tokens) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/token/")
            .set_json(json!({ "username": "alice", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["token_type"], "Bearer");

    let (status, refreshed) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/token/refresh/")
            .set_json(json!({ "refresh": tokens["refresh"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = refreshed["access"].as_str().unwrap();
    let (status, me) = send(
        &app,
        test::TestRequest::get().uri("/api/me/").insert_header(bearer(access)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
}

#[actix_web::test]
async fn test_bad_login_and_missing_fields() {
    let app = test_state();
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "password");
}

#[actix_web::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = test_state();

    let (_, body) = send(
        &app,
        test::TestRequest::post().uri("/api/register/").set_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct horse",
        })),
    )
    .await;
    let refresh = body["refresh"].as_str().unwrap();

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri("/api/me/").insert_header(bearer(refresh)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_post_lifecycle_and_slugs() {
    let app = test_state();
    let token = register(&app, "alice").await;

    let first = create_post(&app, &token, "Hello World", "published").await;
    let second = create_post(&app, &token, "Hello World", "published").await;
    assert_eq!(first["slug"], "hello-world");
    assert_eq!(second["slug"], "hello-world-1");

    let (status, by_slug) = send(
        &app,
        test::TestRequest::get().uri("/api/posts/by-slug/hello-world-1/"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["id"], second["id"]);

    let id = first["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/posts/{id}/"))
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["slug"], "hello-world");

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}/"))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/api/posts/{id}/"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_status_is_rejected() {
    let app = test_state();
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "T", "content": "C", "status": "archived" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "status");
}

#[actix_web::test]
async fn test_non_owner_cannot_modify_post() {
    let app = test_state();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post = create_post(&app, &alice, "Mine", "published").await;
    let id = post["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/posts/{id}/"))
            .insert_header(bearer(&bob))
            .set_json(json!({ "title": "Stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, test::TestRequest::delete().uri(&format!("/api/posts/{id}/"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_drafts_stay_private() {
    let app = test_state();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    create_post(&app, &alice, "Public", "published").await;
    let draft = create_post(&app, &alice, "Secret", "draft").await;
    let id = draft["id"].as_str().unwrap();

    let (_, listing) = send(&app, test::TestRequest::get().uri("/api/posts/")).await;
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["results"][0]["title"], "Public");

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts/{id}/"))
            .insert_header(bearer(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, mine) = send(
        &app,
        test::TestRequest::get().uri("/api/posts/mine/").insert_header(bearer(&alice)),
    )
    .await;
    assert_eq!(mine["count"], 2);
}

#[actix_web::test]
async fn test_listing_search_and_ordering() {
    let app = test_state();
    let token = register(&app, "alice").await;
    create_post(&app, &token, "Rust ownership", "published").await;
    create_post(&app, &token, "Async rust", "published").await;
    create_post(&app, &token, "Gardening", "published").await;

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/posts/?search=RUST&ordering=title"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["title"], "Async rust");
    assert_eq!(body["results"][1]["title"], "Rust ownership");
}

#[actix_web::test]
async fn test_like_toggle() {
    let app = test_state();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post = create_post(&app, &alice, "Likeable", "published").await;
    let uri = format!("/api/posts/{}/like/", post["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri(&uri).insert_header(bearer(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["liked"], true);
    assert_eq!(body["count"], 1);

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri(&uri).insert_header(bearer(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liked"], false);
    assert_eq!(body["count"], 0);

    let (status, _) = send(&app, test::TestRequest::post().uri(&uri)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_like_collection() {
    let app = test_state();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post = create_post(&app, &alice, "Likeable", "published").await;
    let post_id = post["id"].as_str().unwrap();

    let (status, like) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/likes/")
            .insert_header(bearer(&bob))
            .set_json(json!({ "post": post_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/likes/")
            .insert_header(bearer(&bob))
            .set_json(json!({ "post": post_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, likes) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/likes/?post={post_id}"))
            .insert_header(bearer(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(likes.as_array().unwrap().len(), 1);

    let like_uri = format!("/api/likes/{}/", like["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&like_uri).insert_header(bearer(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&like_uri).insert_header(bearer(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_guest_and_member_comments() {
    let app = test_state();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post = create_post(&app, &alice, "Discuss", "published").await;
    let post_id = post["id"].as_str().unwrap();
    let add_uri = format!("/api/posts/{post_id}/add_comment/");

    let (status, guest) = send(
        &app,
        test::TestRequest::post()
            .uri(&add_uri)
            .set_json(json!({ "content": "Nice", "guest_name": "Visitor" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(guest["display_name"], "Visitor");
    assert_eq!(guest["is_approved"], true);
    assert_eq!(guest["author"], Value::Null);

    let (status, member) = send(
        &app,
        test::TestRequest::post()
            .uri(&add_uri)
            .insert_header(bearer(&bob))
            .set_json(json!({ "content": "Agreed", "guest_name": "Ignored" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["display_name"], "bob");
    assert_eq!(member["guest_name"], Value::Null);

    let (_, listed) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/posts/{post_id}/comments/")),
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let guest_uri = format!("/api/comments/{}/", guest["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&guest_uri).insert_header(bearer(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let member_uri = format!("/api/comments/{}/", member["id"].as_str().unwrap());
    let (status, edited) = send(
        &app,
        test::TestRequest::patch()
            .uri(&member_uri)
            .insert_header(bearer(&bob))
            .set_json(json!({ "content": "Strongly agreed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["content"], "Strongly agreed");
}

#[actix_web::test]
async fn test_collection_comment_needs_approval() {
    let app = test_state();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post = create_post(&app, &alice, "Moderated", "published").await;
    let post_id = post["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/comments/")
            .insert_header(bearer(&bob))
            .set_json(json!({ "content": "First" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "post");

    let (status, comment) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/comments/")
            .insert_header(bearer(&bob))
            .set_json(json!({ "post": post_id, "content": "First" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["is_approved"], false);

    let (_, approved) = send(&app, test::TestRequest::get().uri("/api/comments/")).await;
    assert!(approved.as_array().unwrap().is_empty());

    let comment_uri = format!("/api/comments/{}/", comment["id"].as_str().unwrap());
    let (status, _) = send(&app, test::TestRequest::get().uri(&comment_uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let approve_uri = format!("{comment_uri}approve/");
    let (status, _) = send(
        &app,
        test::TestRequest::post().uri(&approve_uri).insert_header(bearer(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri(&approve_uri).insert_header(bearer(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_approved"], true);

    let (_, approved) = send(&app, test::TestRequest::get().uri("/api/comments/")).await;
    assert_eq!(approved.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_malformed_input() {
    let app = test_state();
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .insert_header(bearer(&token))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _) = send(&app, test::TestRequest::get().uri("/api/posts/not-a-uuid/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/posts/by-slug/anything/")
            .insert_header(("Authorization", "Bearer garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_stats() {
    let app = test_state();
    let token = register(&app, "alice").await;
    create_post(&app, &token, "Live", "published").await;
    create_post(&app, &token, "Hidden", "draft").await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/stats/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published_posts"], 1);
    assert_eq!(body["users"], 1);
    assert_eq!(body["comments"], 0);
}
