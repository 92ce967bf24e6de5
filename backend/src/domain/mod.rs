//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the clinic's strongly typed entities (users, dentists,
//! bookings), the ports adapters implement, and the services that enforce
//! ownership and booking rules. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Identity — authenticated caller with a role-based capability check.
//! - CredentialStore, BookingLedger, DentistDirectory, UserDirectory — the
//!   services behind the driving ports in [`ports`].

pub mod auth;
pub mod booking;
pub mod booking_ledger;
pub mod credential_store;
pub mod dentist;
pub mod dentist_directory;
pub mod dentist_query;
pub mod error;
pub mod ids;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_directory;

pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN_LEN, Password, PasswordChange,
    Registration, SessionToken,
};
pub use self::booking::{
    Booking, BookingPatch, BookingScope, BookingValidationError, BookingView, UserBookingEntry,
    UserWithBookings, parse_booking_date,
};
pub use self::booking_ledger::BookingLedger;
pub use self::credential_store::{CredentialStore, NOT_AUTHORIZED_MESSAGE};
pub use self::dentist::{
    DENTIST_NAME_MAX, Dentist, DentistDetails, DentistDraft, DentistName, DentistPatch,
    DentistSummary, DentistValidationError, ExperienceYears, Expertise,
};
pub use self::dentist_directory::DentistDirectory;
pub use self::dentist_query::{
    Comparison, DentistField, DentistFilter, DentistListQuery, DentistQueryError, SortKey,
};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{BookingId, DentistId, IdParseError, UserId};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, Identity, ProfileUpdate, Role, TelephoneNumber, User, UserCredentials, UserName,
    UserValidationError,
};
pub use self::user_directory::UserDirectory;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use clinic_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
