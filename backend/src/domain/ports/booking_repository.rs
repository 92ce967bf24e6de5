//! Port for booking persistence.
//!
//! Adapters own the one-booking-per-user rule: [`BookingRepository::insert`]
//! must check and insert atomically so concurrent requests from the same user
//! cannot both succeed.

use async_trait::async_trait;

use crate::domain::{
    Booking, BookingId, BookingScope, BookingView, DentistId, UserBookingEntry, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
        /// The user already holds a capped booking.
        DuplicateBooking { user_id: String } => "user {user_id} already holds a booking",
        /// The referenced dentist does not exist.
        DentistMissing { dentist_id: String } => "dentist {dentist_id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking, enforcing the per-user cap for non-exempt rows.
    async fn insert(&self, booking: &Booking) -> Result<BookingView, BookingRepositoryError>;

    /// Fetch a booking with its dentist.
    async fn find_by_id(&self, id: &BookingId)
    -> Result<Option<BookingView>, BookingRepositoryError>;

    /// List bookings visible in `scope`, oldest first.
    async fn list(&self, scope: BookingScope) -> Result<Vec<BookingView>, BookingRepositoryError>;

    /// Overwrite the mutable fields of a stored booking.
    async fn update(&self, booking: &Booking)
    -> Result<Option<BookingView>, BookingRepositoryError>;

    /// Remove a booking. Returns `false` when it did not exist.
    async fn delete(&self, id: &BookingId) -> Result<bool, BookingRepositoryError>;

    /// Remove every booking for a dentist, returning how many were removed.
    async fn delete_for_dentist(&self, dentist: &DentistId) -> Result<u64, BookingRepositoryError>;

    /// Bookings owned by any of `users`, paired with their owner.
    async fn list_for_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<(UserId, UserBookingEntry)>, BookingRepositoryError>;
}
