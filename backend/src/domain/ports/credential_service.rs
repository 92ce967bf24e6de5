//! Driving port for account and session use-cases.
//!
//! Inbound adapters call this port to register, log in, and resolve session
//! tokens without knowing how users or hashes are stored.

use async_trait::async_trait;

use crate::domain::{
    Error, Identity, LoginCredentials, PasswordChange, ProfileUpdate, Registration, SessionToken,
    User, UserId,
};

/// Outcome of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: SessionToken,
}

/// Domain use-case port for credentials and sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Create a `user`-role account and open a session for it.
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error>;

    /// Verify an email/password pair and open a session.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Replace the password after checking the current one.
    async fn change_password(&self, user: &UserId, change: &PasswordChange) -> Result<(), Error>;

    /// Sign a fresh session token for `user`.
    async fn issue_session_token(&self, user: &UserId) -> Result<SessionToken, Error>;

    /// Verify a presented token and load the caller's current role.
    async fn resolve_identity(&self, token: &str) -> Result<Identity, Error>;

    /// Load the caller's own profile.
    async fn current_user(&self, user: &UserId) -> Result<User, Error>;

    /// Change the caller's name or telephone number.
    async fn update_profile(&self, user: &UserId, update: &ProfileUpdate) -> Result<User, Error>;
}
