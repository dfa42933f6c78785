//! Authentication Module
//!
//! Handles registration and login. Every successful call returns a fresh
//! bearer token; there is no server-side session state.

pub mod handlers;
pub mod middleware;
pub mod token;

use bcrypt::{hash, verify};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{Role, User};
use crate::store::UserStore;
pub use token::{TokenManager, TokenSubject};

/// Username/password pair used by both register and login
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::InvalidInput("Username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::InvalidInput("Password is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Auth manager handles all authentication
pub struct AuthManager {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenManager>,
    bcrypt_cost: u32,
}

impl AuthManager {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenManager>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    /// Create a user without issuing a token. Used by registration and seeding.
    pub async fn create_user(&self, credentials: &Credentials, role: Role) -> Result<User> {
        credentials.validate()?;

        if self
            .users
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateUsername);
        }

        let password_hash = hash(&credentials.password, self.bcrypt_cost)?;

        // the UNIQUE constraint catches a concurrent registration of the same name
        let user = self
            .users
            .insert(&credentials.username, &password_hash, role, Utc::now())
            .await?;

        info!("[Auth] User registered: {} ({})", user.username, user.role);
        Ok(user)
    }

    /// Register a new admin and return a token for it
    pub async fn register(&self, credentials: &Credentials) -> Result<String> {
        let user = self.create_user(credentials, Role::Admin).await?;
        self.tokens.issue(&user.username, user.role)
    }

    /// Verify credentials and return a token
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        credentials.validate()?;

        let user = self
            .users
            .find_by_username(&credentials.username)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !verify(&credentials.password, &user.password_hash)? {
            warn!("[Auth] Failed login attempt for {}", credentials.username);
            return Err(Error::InvalidCredentials);
        }

        info!("[Auth] User logged in: {}", user.username);
        self.tokens.issue(&user.username, user.role)
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.users.find_by_username(username).await?.is_some())
    }

    /// Resolve a bearer token to its subject
    pub fn authenticate(&self, token: &str) -> Result<TokenSubject> {
        self.tokens.validate(token)
    }
}
