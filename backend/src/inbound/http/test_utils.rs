//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;

use crate::domain::ports::{
    MockBookingService, MockCredentialService, MockDentistService, MockUserDirectoryQuery,
};
use crate::domain::{Email, Identity, Role, TelephoneNumber, User, UserId, UserName};

use super::state::{HttpState, HttpStatePorts, SessionCookieSettings};

/// Token accepted by [`credentials_resolving`] doubles.
pub const TEST_TOKEN: &str = "test-token";

/// Mock ports that a handler test can configure before building state.
#[derive(Default)]
pub struct MockPorts {
    pub credentials: MockCredentialService,
    pub bookings: MockBookingService,
    pub dentists: MockDentistService,
    pub users: MockUserDirectoryQuery,
}

impl MockPorts {
    /// Build handler state around the configured mocks.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            HttpStatePorts {
                credentials: Arc::new(self.credentials),
                bookings: Arc::new(self.bookings),
                dentists: Arc::new(self.dentists),
                users: Arc::new(self.users),
            },
            SessionCookieSettings::default(),
        ))
    }
}

/// Credential double that resolves [`TEST_TOKEN`] to `identity`.
pub fn credentials_resolving(identity: Identity) -> MockCredentialService {
    let mut credentials = MockCredentialService::new();
    credentials
        .expect_resolve_identity()
        .returning(move |token| {
            if token == TEST_TOKEN {
                Ok(identity)
            } else {
                Err(crate::domain::Error::unauthorized(
                    crate::domain::NOT_AUTHORIZED_MESSAGE,
                ))
            }
        });
    credentials
}

/// `Authorization` header value carrying [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// A stored account with the given role.
pub fn sample_user(role: Role) -> User {
    User {
        id: UserId::random(),
        name: UserName::new("Ada Lovelace").expect("name"),
        telephone_number: TelephoneNumber::new("0812345678").expect("phone"),
        email: Email::new("ada@example.com").expect("email"),
        role,
        created_at: Utc::now(),
    }
}
