//! Booking ledger service.
//!
//! Applies ownership checks before every single-booking operation and relies
//! on the [`BookingRepository`] to enforce the one-booking cap atomically.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, BookingService, DentistRepository,
    DentistRepositoryError,
};
use crate::domain::{
    Booking, BookingId, BookingPatch, BookingScope, BookingView, DentistId, Error, Identity,
};

/// Booking ledger implementing [`BookingService`].
#[derive(Clone)]
pub struct BookingLedger<B, D> {
    bookings: Arc<B>,
    dentists: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<B, D> BookingLedger<B, D> {
    /// Create a new ledger.
    pub fn new(bookings: Arc<B>, dentists: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bookings,
            dentists,
            clock,
        }
    }
}

pub(crate) fn booking_not_found(id: &BookingId) -> Error {
    Error::not_found(format!("No booking with the id of {id}"))
}

pub(crate) fn dentist_not_found(id: impl std::fmt::Display) -> Error {
    Error::not_found(format!("No dentist with the id of {id}"))
}

fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
        BookingRepositoryError::DuplicateBooking { user_id } => Error::duplicate_booking(format!(
            "The user with ID {user_id} has already made a booking. Only 1 booking is allowed."
        )),
        BookingRepositoryError::DentistMissing { dentist_id } => dentist_not_found(dentist_id),
    }
}

pub(crate) fn map_dentist_error(error: DentistRepositoryError) -> Error {
    match error {
        DentistRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("dentist repository unavailable: {message}"))
        }
        DentistRepositoryError::Query { message } => {
            Error::internal(format!("dentist repository error: {message}"))
        }
    }
}

impl<B, D> BookingLedger<B, D>
where
    B: BookingRepository,
    D: DentistRepository,
{
    async fn owned_booking(
        &self,
        caller: &Identity,
        id: &BookingId,
        action: &str,
    ) -> Result<BookingView, Error> {
        let view = self
            .bookings
            .find_by_id(id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| booking_not_found(id))?;
        if !caller.can_act_on(&view.booking.user) {
            return Err(Error::forbidden(format!(
                "User {} is not authorized to {action} this booking",
                caller.user_id
            )));
        }
        Ok(view)
    }

    async fn ensure_dentist(&self, id: &DentistId) -> Result<(), Error> {
        self.dentists
            .find_by_id(id)
            .await
            .map_err(map_dentist_error)?
            .map(|_| ())
            .ok_or_else(|| dentist_not_found(id))
    }
}

#[async_trait]
impl<B, D> BookingService for BookingLedger<B, D>
where
    B: BookingRepository,
    D: DentistRepository,
{
    async fn list_bookings(
        &self,
        caller: &Identity,
        dentist: Option<DentistId>,
    ) -> Result<Vec<BookingView>, Error> {
        self.bookings
            .list(BookingScope::for_caller(caller, dentist))
            .await
            .map_err(map_booking_error)
    }

    async fn get_booking(&self, caller: &Identity, id: &BookingId) -> Result<BookingView, Error> {
        self.owned_booking(caller, id, "view").await
    }

    async fn add_booking(
        &self,
        caller: &Identity,
        dentist: &DentistId,
        booking_date: DateTime<Utc>,
    ) -> Result<BookingView, Error> {
        self.ensure_dentist(dentist).await?;
        let booking = Booking::create(caller, *dentist, booking_date, self.clock.utc());
        let view = self
            .bookings
            .insert(&booking)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %view.booking.id, user_id = %caller.user_id, "booking created");
        Ok(view)
    }

    async fn update_booking(
        &self,
        caller: &Identity,
        id: &BookingId,
        patch: BookingPatch,
    ) -> Result<BookingView, Error> {
        let view = self.owned_booking(caller, id, "update").await?;
        if let Some(dentist) = patch.dentist.as_ref() {
            self.ensure_dentist(dentist).await?;
        }
        let mut booking = view.booking;
        booking.apply(&patch);
        self.bookings
            .update(&booking)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| booking_not_found(id))
    }

    async fn delete_booking(&self, caller: &Identity, id: &BookingId) -> Result<(), Error> {
        self.owned_booking(caller, id, "delete").await?;
        if self.bookings.delete(id).await.map_err(map_booking_error)? {
            Ok(())
        } else {
            Err(booking_not_found(id))
        }
    }

    async fn cascade_delete_for_dentist(&self, dentist: &DentistId) -> Result<u64, Error> {
        let removed = self
            .bookings
            .delete_for_dentist(dentist)
            .await
            .map_err(map_booking_error)?;
        info!(dentist_id = %dentist, removed, "bookings removed with dentist");
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "booking_ledger_tests.rs"]
mod tests;
