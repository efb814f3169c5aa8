//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::domain::User;
use quill_core::ports::TokenKind;
use quill_core::service::NewUser;
use quill_shared::dto::{
    AccessResponse, AuthResponse, LoginRequest, RefreshRequest, RegisterUserRequest,
};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Issue an access/refresh pair for a user.
fn token_pair(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access = state
        .tokens
        .generate_token(user.id, &user.username, TokenKind::Access)?;
    let refresh = state
        .tokens
        .generate_token(user.id, &user.username, TokenKind::Refresh)?;

    Ok(AuthResponse {
        user: views::user(user),
        access,
        refresh,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds(TokenKind::Access).max(0) as u64,
    })
}

/// The account behind a token. A deleted account invalidates its tokens.
async fn token_owner(state: &AppState, user_id: uuid::Uuid) -> AppResult<User> {
    match state.accounts.get(user_id).await {
        Ok(user) => Ok(user),
        Err(DomainError::NotFound { .. }) => {
            Err(AppError::Unauthorized("User no longer exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/register/
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .accounts
        .register(NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok(HttpResponse::Created().json(token_pair(&state, &user)?))
}

/// POST /api/login/ and /api/token/
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .accounts
        .authenticate(&req.username, &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(HttpResponse::Ok().json(token_pair(&state, &user)?))
}

/// POST /api/token/refresh/
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let claims = state
        .tokens
        .validate_token(&body.refresh, TokenKind::Refresh)?;

    let user = token_owner(&state, claims.user_id).await?;

    let access = state
        .tokens
        .generate_token(user.id, &user.username, TokenKind::Access)?;

    Ok(HttpResponse::Ok().json(AccessResponse {
        access,
        expires_in: state.tokens.expiration_seconds(TokenKind::Access).max(0) as u64,
    }))
}

/// GET /api/me/ - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    tracing::debug!(username = %identity.username, "Profile requested");
    let user = token_owner(&state, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}
