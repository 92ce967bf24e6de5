//! Driving port for booking use-cases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BookingId, BookingPatch, BookingView, DentistId, Error, Identity};

/// Domain use-case port for the booking ledger.
///
/// Every operation that touches a single booking checks that the caller owns
/// it or is an admin.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Bookings visible to `caller`, optionally narrowed to one dentist.
    async fn list_bookings(
        &self,
        caller: &Identity,
        dentist: Option<DentistId>,
    ) -> Result<Vec<BookingView>, Error>;

    /// Fetch one booking.
    async fn get_booking(&self, caller: &Identity, id: &BookingId) -> Result<BookingView, Error>;

    /// Book `dentist` for the caller.
    async fn add_booking(
        &self,
        caller: &Identity,
        dentist: &DentistId,
        booking_date: DateTime<Utc>,
    ) -> Result<BookingView, Error>;

    /// Change the date or dentist of a booking.
    async fn update_booking(
        &self,
        caller: &Identity,
        id: &BookingId,
        patch: BookingPatch,
    ) -> Result<BookingView, Error>;

    /// Remove a booking.
    async fn delete_booking(&self, caller: &Identity, id: &BookingId) -> Result<(), Error>;

    /// Remove every booking for a dentist ahead of deleting it.
    async fn cascade_delete_for_dentist(&self, dentist: &DentistId) -> Result<u64, Error>;
}
