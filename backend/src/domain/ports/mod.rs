//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`SessionTokens`]) are
//! implemented by outbound adapters. Driving ports (`*Service`,
//! [`UserDirectoryQuery`]) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_repository;
mod booking_service;
mod credential_service;
mod dentist_repository;
mod dentist_service;
mod password_hasher;
mod session_tokens;
mod user_directory_query;
mod user_repository;

#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use booking_service::MockBookingService;
pub use booking_service::BookingService;
#[cfg(test)]
pub use credential_service::MockCredentialService;
pub use credential_service::{AuthSession, CredentialService};
#[cfg(test)]
pub use dentist_repository::MockDentistRepository;
pub use dentist_repository::{DentistRepository, DentistRepositoryError};
#[cfg(test)]
pub use dentist_service::MockDentistService;
pub use dentist_service::DentistService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use session_tokens::MockSessionTokens;
pub use session_tokens::{SessionTokenError, SessionTokens};
#[cfg(test)]
pub use user_directory_query::MockUserDirectoryQuery;
pub use user_directory_query::UserDirectoryQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
