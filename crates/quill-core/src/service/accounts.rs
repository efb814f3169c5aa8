use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::{DomainError, RepoError, Validator};
use crate::ports::{PasswordService, UserRepository};

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

/// Registration input.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registration and credential checks.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Create an account. Username and email must both be unused.
    pub async fn register(&self, input: NewUser) -> Result<User, DomainError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();

        Validator::new()
            .required("username", &username)
            .max_len("username", &username, MAX_USERNAME_LEN)
            .check(
                !username.contains(char::is_whitespace),
                "username",
                "Usernames may not contain whitespace.",
            )
            .required("email", &email)
            .max_len("email", &email, MAX_EMAIL_LEN)
            .check(
                email.is_empty() || email.contains('@'),
                "email",
                "Enter a valid email address.",
            )
            .check(
                input.password.chars().count() >= MIN_PASSWORD_LEN,
                "password",
                "Password must be at least 8 characters.",
            )
            .max_len("first_name", &input.first_name, MAX_NAME_LEN)
            .max_len("last_name", &input.last_name, MAX_NAME_LEN)
            .finish()?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict(
                "A user with that username already exists.".to_string(),
            ));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict(
                "A user with that email already exists.".to_string(),
            ));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(
            username,
            email,
            input.first_name.trim().to_string(),
            input.last_name.trim().to_string(),
            password_hash,
        );

        let user = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => {
                DomainError::Conflict("A user with that username or email already exists.".into())
            }
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username/password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        Validator::new()
            .required("username", username)
            .required("password", password)
            .finish()?;

        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            return Err(DomainError::InvalidCredentials);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }
}
