//! Builders wiring storage adapters into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use chrono::Duration;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{BookingRepository, DentistRepository, UserRepository};
use crate::domain::{BookingLedger, CredentialStore, DentistDirectory, UserDirectory};
use crate::inbound::http::health::ReadinessProbe;
use crate::inbound::http::session_config::TokenSettings;
use crate::inbound::http::state::{HttpState, HttpStatePorts, SessionCookieSettings};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselDentistRepository, DieselUserRepository,
};
use crate::outbound::security::{Argon2PasswordHasher, JwtSessionTokens};

/// Storage backend selected at startup.
#[derive(Clone)]
pub enum Storage {
    /// PostgreSQL through the Diesel repositories.
    Postgres(DbPool),
    /// Process-local store; data is lost on restart.
    Memory(InMemoryStore),
}

impl Storage {
    /// Readiness probe for the backend, if it has an external dependency.
    pub fn readiness_probe(&self) -> Option<Arc<dyn ReadinessProbe>> {
        match self {
            Self::Postgres(pool) => Some(Arc::new(pool.clone())),
            Self::Memory(_) => None,
        }
    }
}

#[async_trait]
impl ReadinessProbe for DbPool {
    async fn is_ready(&self) -> bool {
        self.ping().await.is_ok()
    }
}

fn build_ports<U, B, D>(
    users: Arc<U>,
    bookings: Arc<B>,
    dentists: Arc<D>,
    tokens: &TokenSettings,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    B: BookingRepository + 'static,
    D: DentistRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let session_tokens = Arc::new(JwtSessionTokens::new(
        tokens.secret.as_slice(),
        Duration::days(i64::from(tokens.token_lifetime_days)),
        clock.clone(),
    ));
    let ledger = Arc::new(BookingLedger::new(
        bookings.clone(),
        dentists.clone(),
        clock.clone(),
    ));

    HttpStatePorts {
        credentials: Arc::new(CredentialStore::new(
            users.clone(),
            Arc::new(Argon2PasswordHasher),
            session_tokens,
            clock.clone(),
        )),
        bookings: ledger.clone(),
        dentists: Arc::new(DentistDirectory::new(dentists, ledger, clock)),
        users: Arc::new(UserDirectory::new(users, bookings)),
    }
}

/// Build the shared HTTP state over the selected storage backend.
pub fn build_http_state(storage: &Storage, tokens: &TokenSettings) -> web::Data<HttpState> {
    let ports = match storage {
        Storage::Postgres(pool) => build_ports(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselBookingRepository::new(pool.clone())),
            Arc::new(DieselDentistRepository::new(pool.clone())),
            tokens,
        ),
        Storage::Memory(store) => {
            let store = Arc::new(store.clone());
            build_ports(store.clone(), store.clone(), store, tokens)
        }
    };
    web::Data::new(HttpState::new(
        ports,
        SessionCookieSettings {
            max_age_days: tokens.cookie_lifetime_days,
            secure: tokens.cookie_secure,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, LoginCredentials, Registration, Role};
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn tokens() -> TokenSettings {
        TokenSettings {
            secret: Zeroizing::new(b"0123456789abcdef0123456789abcdef".to_vec()),
            token_lifetime_days: 1,
            cookie_lifetime_days: 2,
            cookie_secure: true,
        }
    }

    #[rstest]
    fn memory_storage_has_no_readiness_probe() {
        assert!(Storage::Memory(InMemoryStore::new()).readiness_probe().is_none());
    }

    #[rstest]
    fn cookie_settings_follow_token_settings() {
        let state = build_http_state(&Storage::Memory(InMemoryStore::new()), &tokens());
        assert_eq!(
            state.session_cookie,
            SessionCookieSettings {
                max_age_days: 2,
                secure: true,
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_issues_tokens_that_resolve() {
        let state = build_http_state(&Storage::Memory(InMemoryStore::new()), &tokens());
        let registration = Registration::try_from_parts(
            "Ada Lovelace",
            "0812345678",
            "ada@example.com",
            "secret1",
        )
        .expect("valid registration");
        state
            .credentials
            .register(&registration)
            .await
            .expect("register");

        let credentials = LoginCredentials::try_from_parts("ada@example.com", "secret1")
            .expect("credentials shape");
        let session = state
            .credentials
            .authenticate(&credentials)
            .await
            .expect("login");
        let identity: Identity = state
            .credentials
            .resolve_identity(session.token.as_str())
            .await
            .expect("token resolves");
        assert_eq!(identity.role, Role::User);
    }
}
