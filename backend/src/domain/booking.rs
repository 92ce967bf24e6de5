//! Bookings link one user to one dentist on a given date.
//!
//! A booking created by a non-admin counts against that user's cap of one
//! active booking. Bookings created by admins carry `cap_exempt` so the
//! storage layer can enforce the cap with a partial uniqueness rule.

use chrono::{DateTime, NaiveDate, Utc};

use super::{BookingId, DentistId, DentistSummary, Identity, User, UserId};

/// Raised when a booking date cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    #[error("Please add a booking date")]
    MissingDate,
    #[error("bookingDate must be an RFC 3339 timestamp or YYYY-MM-DD date, got '{value}'")]
    InvalidDate { value: String },
}

impl BookingValidationError {
    /// Request field the error refers to.
    pub const fn field(&self) -> &'static str {
        "bookingDate"
    }
}

/// Parse a booking date from either a full timestamp or a calendar date.
///
/// Calendar dates resolve to midnight UTC.
///
/// # Examples
/// ```
/// use clinic_backend::domain::parse_booking_date;
///
/// let date = parse_booking_date("2025-03-14").expect("calendar date");
/// assert_eq!(date.to_rfc3339(), "2025-03-14T00:00:00+00:00");
/// assert!(parse_booking_date("next tuesday").is_err());
/// ```
pub fn parse_booking_date(raw: &str) -> Result<DateTime<Utc>, BookingValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BookingValidationError::MissingDate);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| BookingValidationError::InvalidDate {
            value: trimmed.to_owned(),
        })
}

/// Stored booking record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub booking_date: DateTime<Utc>,
    pub user: UserId,
    pub dentist: DentistId,
    /// Set when an admin created the booking; exempt from the per-user cap.
    pub cap_exempt: bool,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Materialise a new booking for `caller`.
    pub fn create(
        caller: &Identity,
        dentist: DentistId,
        booking_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookingId::random(),
            booking_date,
            user: caller.user_id,
            dentist,
            cap_exempt: caller.is_admin(),
            created_at: now,
        }
    }

    /// Apply a patch. The owning user is never part of a patch.
    pub fn apply(&mut self, patch: &BookingPatch) {
        if let Some(date) = patch.booking_date {
            self.booking_date = date;
        }
        if let Some(dentist) = patch.dentist {
            self.dentist = dentist;
        }
    }
}

/// Partial booking update.
///
/// Ownership is fixed at creation, so there is no `user` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingPatch {
    pub booking_date: Option<DateTime<Utc>>,
    pub dentist: Option<DentistId>,
}

impl BookingPatch {
    /// True when nothing would change.
    pub const fn is_empty(&self) -> bool {
        self.booking_date.is_none() && self.dentist.is_none()
    }
}

/// Which bookings a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    /// Every booking, optionally narrowed to one dentist.
    All { dentist: Option<DentistId> },
    /// Only bookings owned by this user.
    Owner(UserId),
}

impl BookingScope {
    /// Non-admins only ever see their own bookings, whatever the filter.
    pub const fn for_caller(caller: &Identity, dentist: Option<DentistId>) -> Self {
        if caller.is_admin() {
            Self::All { dentist }
        } else {
            Self::Owner(caller.user_id)
        }
    }
}

/// A booking with its dentist joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingView {
    pub booking: Booking,
    pub dentist: DentistSummary,
}

/// Compact booking entry listed under a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBookingEntry {
    pub id: BookingId,
    pub booking_date: DateTime<Utc>,
    pub dentist_id: DentistId,
    pub dentist_name: String,
}

/// A user together with the bookings that reference them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithBookings {
    pub user: User,
    pub bookings: Vec<UserBookingEntry>,
}
