//! Shared HTTP adapter state.
//!
//! Handlers receive this state via `actix_web::web::Data` so they depend only
//! on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BookingService, CredentialService, DentistService, UserDirectoryQuery,
};

/// How the `token` cookie is written on login and registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookieSettings {
    /// Cookie lifetime in days.
    pub max_age_days: u32,
    /// Whether the cookie carries the `Secure` attribute.
    pub secure: bool,
}

impl Default for SessionCookieSettings {
    fn default() -> Self {
        Self {
            max_age_days: 30,
            secure: false,
        }
    }
}

/// Parameter object bundling the driving ports used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub credentials: Arc<dyn CredentialService>,
    pub bookings: Arc<dyn BookingService>,
    pub dentists: Arc<dyn DentistService>,
    pub users: Arc<dyn UserDirectoryQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub credentials: Arc<dyn CredentialService>,
    pub bookings: Arc<dyn BookingService>,
    pub dentists: Arc<dyn DentistService>,
    pub users: Arc<dyn UserDirectoryQuery>,
    pub session_cookie: SessionCookieSettings,
}

impl HttpState {
    /// Construct state from the ports bundle and cookie settings.
    pub fn new(ports: HttpStatePorts, session_cookie: SessionCookieSettings) -> Self {
        let HttpStatePorts {
            credentials,
            bookings,
            dentists,
            users,
        } = ports;
        Self {
            credentials,
            bookings,
            dentists,
            users,
            session_cookie,
        }
    }
}
