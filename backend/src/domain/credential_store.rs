//! Credential store service: accounts, password hashes, and session tokens.
//!
//! Implements [`CredentialService`] over a [`UserRepository`], a
//! [`PasswordHasher`], and a [`SessionTokens`] issuer. Hashing and
//! verification run on the blocking thread pool.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::domain::ports::{
    AuthSession, CredentialService, PasswordHashError, PasswordHasher, SessionTokenError,
    SessionTokens, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, Identity, LoginCredentials, PasswordChange, ProfileUpdate, Registration, Role,
    SessionToken, User, UserId,
};

/// Message returned for every rejected session token.
pub const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized to access this route";

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Account and session service.
#[derive(Clone)]
pub struct CredentialStore<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    decoy_hash: Arc<OnceCell<String>>,
}

impl<U, H, T> CredentialStore<U, H, T> {
    /// Create a new store over the given adapters.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::invalid_request("Email is already registered")
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
        UserPersistenceError::DuplicateTelephone { .. } => {
            Error::invalid_request("Telephone number is already registered").with_details(
                json!({ "field": "telephoneNumber", "code": "duplicate_telephone_number" }),
            )
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: SessionTokenError) -> Error {
    match error {
        SessionTokenError::Issue { message } => {
            Error::internal(format!("session token issue failed: {message}"))
        }
        SessionTokenError::Invalid { message } => {
            debug!(%message, "session token rejected");
            Error::unauthorized(NOT_AUTHORIZED_MESSAGE)
        }
    }
}

impl<U, H, T> CredentialStore<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: SessionTokens,
{
    async fn hash(&self, password: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = zeroize::Zeroizing::new(password.to_owned());
        let stored_hash = stored_hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(password.as_str(), &stored_hash))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
            .map_err(map_hash_error)
    }

    /// Verify `password` against a hash no account owns.
    ///
    /// Logins for unknown emails run this so they pay for one Argon2
    /// verification, like a wrong password does.
    async fn verify_against_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await;
        let outcome = match decoy {
            Ok(hash) => self.verify(password, hash).await.map(drop),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            debug!(error = %err, "decoy password verification failed");
        }
    }

    fn issue(&self, user: &UserId) -> Result<SessionToken, Error> {
        self.tokens.issue(user).map_err(map_token_error)
    }
}

#[async_trait]
impl<U, H, T> CredentialService for CredentialStore<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: SessionTokens,
{
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error> {
        let password_hash = self.hash(registration.password.expose()).await?;
        let user = User {
            id: UserId::random(),
            name: registration.name.clone(),
            telephone_number: registration.telephone_number.clone(),
            email: registration.email.clone(),
            role: Role::User,
            created_at: self.clock.utc(),
        };
        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(map_user_error)?;
        let token = self.issue(&user.id)?;
        Ok(AuthSession { user, token })
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            self.verify_against_decoy(credentials.password()).await;
            return Err(Error::invalid_credentials());
        };
        if !self
            .verify(credentials.password(), &stored.password_hash)
            .await?
        {
            return Err(Error::invalid_credentials());
        }
        let token = self.issue(&stored.user.id)?;
        Ok(AuthSession {
            user: stored.user,
            token,
        })
    }

    async fn change_password(&self, user: &UserId, change: &PasswordChange) -> Result<(), Error> {
        let stored = self
            .users
            .find_credentials_by_id(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED_MESSAGE))?;
        if !self.verify(change.current.as_str(), &stored.password_hash).await? {
            return Err(Error::invalid_credentials());
        }
        let password_hash = self.hash(change.new.expose()).await?;
        self.users
            .update_password_hash(user, &password_hash)
            .await
            .map_err(map_user_error)
    }

    async fn issue_session_token(&self, user: &UserId) -> Result<SessionToken, Error> {
        self.issue(user)
    }

    async fn resolve_identity(&self, token: &str) -> Result<Identity, Error> {
        let user_id = self.tokens.verify(token).map_err(map_token_error)?;
        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED_MESSAGE))?;
        Ok(Identity::new(user.id, user.role))
    }

    async fn current_user(&self, user: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("No user with the id of {user}")))
    }

    async fn update_profile(&self, user: &UserId, update: &ProfileUpdate) -> Result<User, Error> {
        if update.is_empty() {
            return self.current_user(user).await;
        }
        self.users
            .update_profile(user, update)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("No user with the id of {user}")))
    }
}

#[cfg(test)]
#[path = "credential_store_tests.rs"]
mod tests;
